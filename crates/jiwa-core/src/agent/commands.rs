//! Slash commands available in the chat.

use std::path::PathBuf;

use jiwa_tools::Language;

pub const HELP: &str = "Perintah yang tersedia:
/upload <file.pdf>        unggah dokumen kesehatan mental
/history                  tampilkan riwayat percakapan
/reset                    hapus riwayat chat dan dokumen
/save                     simpan riwayat percakapan ke file JSON
/tips                     tips mengatasi stres
/pro [topik]              sumber bantuan profesional
/date                     tanggal hari ini
/translate id|en <teks>   terjemahkan teks
/help                     tampilkan bantuan ini
exit, quit                keluar";

const UPLOAD_USAGE: &str = "Penggunaan: /upload <file.pdf>";
const TRANSLATE_USAGE: &str = "Penggunaan: /translate id|en <teks>";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Upload(PathBuf),
    History,
    Reset,
    Save,
    Tips,
    Pro(Option<String>),
    Date,
    Translate(Language, String),
    Help,
    /// Known command with malformed arguments; carries the usage line.
    Invalid(&'static str),
    Unknown(String),
}

impl Command {
    /// Parse a slash command. Returns `None` for ordinary chat text.
    #[must_use]
    pub fn parse(input: &str) -> Option<Self> {
        let input = input.trim();
        if !input.starts_with('/') {
            return None;
        }
        let (name, rest) = input
            .split_once(char::is_whitespace)
            .map_or((input, ""), |(n, r)| (n, r.trim()));

        let command = match name {
            "/upload" if rest.is_empty() => Self::Invalid(UPLOAD_USAGE),
            "/upload" => Self::Upload(PathBuf::from(rest)),
            "/history" => Self::History,
            "/reset" => Self::Reset,
            "/save" => Self::Save,
            "/tips" => Self::Tips,
            "/pro" => Self::Pro((!rest.is_empty()).then(|| rest.to_owned())),
            "/date" => Self::Date,
            "/translate" => parse_translate(rest),
            "/help" => Self::Help,
            other => Self::Unknown(other.to_owned()),
        };
        Some(command)
    }
}

fn parse_translate(rest: &str) -> Command {
    let Some((code, text)) = rest.split_once(char::is_whitespace) else {
        return Command::Invalid(TRANSLATE_USAGE);
    };
    match Language::from_code(code) {
        Some(lang) if !text.trim().is_empty() => Command::Translate(lang, text.trim().to_owned()),
        _ => Command::Invalid(TRANSLATE_USAGE),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_is_not_a_command() {
        assert_eq!(Command::parse("apa itu depresi?"), None);
        assert_eq!(Command::parse("  halo /reset"), None);
    }

    #[test]
    fn parses_simple_commands() {
        assert_eq!(Command::parse("/history"), Some(Command::History));
        assert_eq!(Command::parse(" /reset "), Some(Command::Reset));
        assert_eq!(Command::parse("/save"), Some(Command::Save));
        assert_eq!(Command::parse("/tips"), Some(Command::Tips));
        assert_eq!(Command::parse("/date"), Some(Command::Date));
        assert_eq!(Command::parse("/help"), Some(Command::Help));
    }

    #[test]
    fn upload_keeps_path_with_spaces() {
        assert_eq!(
            Command::parse("/upload laporan kesehatan.pdf"),
            Some(Command::Upload(PathBuf::from("laporan kesehatan.pdf")))
        );
        assert_eq!(Command::parse("/upload"), Some(Command::Invalid(UPLOAD_USAGE)));
    }

    #[test]
    fn pro_query_is_optional() {
        assert_eq!(Command::parse("/pro"), Some(Command::Pro(None)));
        assert_eq!(
            Command::parse("/pro psikolog jakarta"),
            Some(Command::Pro(Some("psikolog jakarta".into())))
        );
    }

    #[test]
    fn translate_requires_language_and_text() {
        assert_eq!(
            Command::parse("/translate en saya cemas"),
            Some(Command::Translate(Language::English, "saya cemas".into()))
        );
        assert_eq!(
            Command::parse("/translate ID I feel anxious"),
            Some(Command::Translate(Language::Indonesian, "I feel anxious".into()))
        );
        assert_eq!(Command::parse("/translate fr bonjour"), Some(Command::Invalid(TRANSLATE_USAGE)));
        assert_eq!(Command::parse("/translate en"), Some(Command::Invalid(TRANSLATE_USAGE)));
    }

    #[test]
    fn unknown_command_is_reported() {
        assert_eq!(Command::parse("/foo bar"), Some(Command::Unknown("/foo".into())));
    }
}
