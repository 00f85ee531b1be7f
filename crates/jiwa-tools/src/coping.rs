pub const COPING_TIPS: &[&str] = &[
    "Practice deep breathing: Inhale for 4 seconds, hold for 7, exhale for 8",
    "Try grounding techniques: Name 5 things you can see, 4 you can touch, 3 you can hear, 2 you can smell, 1 you can taste",
    "Go for a short walk outside to clear your mind",
    "Write down your thoughts in a journal",
    "Listen to calming music or nature sounds",
];

#[must_use]
pub fn coping_tips() -> String {
    let tips: Vec<String> = COPING_TIPS.iter().map(|t| format!("• {t}")).collect();
    format!(
        "Here are some coping strategies you can try:\n\n{}",
        tips.join("\n")
    )
}
