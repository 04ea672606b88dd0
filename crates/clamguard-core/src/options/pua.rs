//! Possibly-unwanted-application signature categories.
//!
//! The set is closed: `--exclude-pua` and `--include-pua` only accept these tags.

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// A PUA category tag such as `Win.Packer`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum PuaCategory {
    AndrAdware,
    AndrDownloader,
    AndrDropper,
    AndrTool,
    AndrTrojan,
    AndrVirus,
    CertRevoked,
    DocDropper,
    DocPacked,
    DocTool,
    DocTrojan,
    EmailPhishing,
    EmailTrojan,
    EmbeddedFile,
    HtmlExploit,
    HtmlTool,
    HtmlTrojan,
    JavaExploit,
    JavaPacker,
    JsExploit,
    OsxFile,
    OsxTrojan,
    PackedTool,
    PdfExploit,
    PdfTrojan,
    PhpTrojan,
    RtfExploit,
    SpyTool,
    SwfSpyware,
    ToolCountermeasure,
    ToolTool,
    UnixAdware,
    UnixCoinminer,
    UnixDownloader,
    UnixFile,
    UnixMalware,
    UnixTool,
    UnixTrojan,
    UnixVirus,
    WinAdware,
    WinCoinminer,
    WinDownloader,
    WinDropper,
    WinExploit,
    WinFile,
    WinIrcbot,
    WinJoke,
    WinKeylogger,
    WinMalware,
    WinPacked,
    WinPacker,
    WinProxy,
    WinRansomware,
    WinSpyware,
    WinTool,
    WinTrojan,
    WinVirus,
}

impl PuaCategory {
    /// Every recognized category, in ClamAV's listing order.
    pub const ALL: [PuaCategory; 57] = [
        PuaCategory::AndrAdware,
        PuaCategory::AndrDownloader,
        PuaCategory::AndrDropper,
        PuaCategory::AndrTool,
        PuaCategory::AndrTrojan,
        PuaCategory::AndrVirus,
        PuaCategory::CertRevoked,
        PuaCategory::DocDropper,
        PuaCategory::DocPacked,
        PuaCategory::DocTool,
        PuaCategory::DocTrojan,
        PuaCategory::EmailPhishing,
        PuaCategory::EmailTrojan,
        PuaCategory::EmbeddedFile,
        PuaCategory::HtmlExploit,
        PuaCategory::HtmlTool,
        PuaCategory::HtmlTrojan,
        PuaCategory::JavaExploit,
        PuaCategory::JavaPacker,
        PuaCategory::JsExploit,
        PuaCategory::OsxFile,
        PuaCategory::OsxTrojan,
        PuaCategory::PackedTool,
        PuaCategory::PdfExploit,
        PuaCategory::PdfTrojan,
        PuaCategory::PhpTrojan,
        PuaCategory::RtfExploit,
        PuaCategory::SpyTool,
        PuaCategory::SwfSpyware,
        PuaCategory::ToolCountermeasure,
        PuaCategory::ToolTool,
        PuaCategory::UnixAdware,
        PuaCategory::UnixCoinminer,
        PuaCategory::UnixDownloader,
        PuaCategory::UnixFile,
        PuaCategory::UnixMalware,
        PuaCategory::UnixTool,
        PuaCategory::UnixTrojan,
        PuaCategory::UnixVirus,
        PuaCategory::WinAdware,
        PuaCategory::WinCoinminer,
        PuaCategory::WinDownloader,
        PuaCategory::WinDropper,
        PuaCategory::WinExploit,
        PuaCategory::WinFile,
        PuaCategory::WinIrcbot,
        PuaCategory::WinJoke,
        PuaCategory::WinKeylogger,
        PuaCategory::WinMalware,
        PuaCategory::WinPacked,
        PuaCategory::WinPacker,
        PuaCategory::WinProxy,
        PuaCategory::WinRansomware,
        PuaCategory::WinSpyware,
        PuaCategory::WinTool,
        PuaCategory::WinTrojan,
        PuaCategory::WinVirus,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PuaCategory::AndrAdware => "Andr.Adware",
            PuaCategory::AndrDownloader => "Andr.Downloader",
            PuaCategory::AndrDropper => "Andr.Dropper",
            PuaCategory::AndrTool => "Andr.Tool",
            PuaCategory::AndrTrojan => "Andr.Trojan",
            PuaCategory::AndrVirus => "Andr.Virus",
            PuaCategory::CertRevoked => "Cert.Revoked",
            PuaCategory::DocDropper => "Doc.Dropper",
            PuaCategory::DocPacked => "Doc.Packed",
            PuaCategory::DocTool => "Doc.Tool",
            PuaCategory::DocTrojan => "Doc.Trojan",
            PuaCategory::EmailPhishing => "Email.Phishing",
            PuaCategory::EmailTrojan => "Email.Trojan",
            PuaCategory::EmbeddedFile => "Embedded.File",
            PuaCategory::HtmlExploit => "Html.Exploit",
            PuaCategory::HtmlTool => "Html.Tool",
            PuaCategory::HtmlTrojan => "Html.Trojan",
            PuaCategory::JavaExploit => "Java.Exploit",
            PuaCategory::JavaPacker => "Java.Packer",
            PuaCategory::JsExploit => "Js.Exploit",
            PuaCategory::OsxFile => "Osx.File",
            PuaCategory::OsxTrojan => "Osx.Trojan",
            PuaCategory::PackedTool => "Packed.Tool",
            PuaCategory::PdfExploit => "Pdf.Exploit",
            PuaCategory::PdfTrojan => "Pdf.Trojan",
            PuaCategory::PhpTrojan => "Php.Trojan",
            PuaCategory::RtfExploit => "Rtf.Exploit",
            PuaCategory::SpyTool => "Spy.Tool",
            PuaCategory::SwfSpyware => "Swf.Spyware",
            PuaCategory::ToolCountermeasure => "Tool.Countermeasure",
            PuaCategory::ToolTool => "Tool.Tool",
            PuaCategory::UnixAdware => "Unix.Adware",
            PuaCategory::UnixCoinminer => "Unix.Coinminer",
            PuaCategory::UnixDownloader => "Unix.Downloader",
            PuaCategory::UnixFile => "Unix.File",
            PuaCategory::UnixMalware => "Unix.Malware",
            PuaCategory::UnixTool => "Unix.Tool",
            PuaCategory::UnixTrojan => "Unix.Trojan",
            PuaCategory::UnixVirus => "Unix.Virus",
            PuaCategory::WinAdware => "Win.Adware",
            PuaCategory::WinCoinminer => "Win.Coinminer",
            PuaCategory::WinDownloader => "Win.Downloader",
            PuaCategory::WinDropper => "Win.Dropper",
            PuaCategory::WinExploit => "Win.Exploit",
            PuaCategory::WinFile => "Win.File",
            PuaCategory::WinIrcbot => "Win.Ircbot",
            PuaCategory::WinJoke => "Win.Joke",
            PuaCategory::WinKeylogger => "Win.Keylogger",
            PuaCategory::WinMalware => "Win.Malware",
            PuaCategory::WinPacked => "Win.Packed",
            PuaCategory::WinPacker => "Win.Packer",
            PuaCategory::WinProxy => "Win.Proxy",
            PuaCategory::WinRansomware => "Win.Ransomware",
            PuaCategory::WinSpyware => "Win.Spyware",
            PuaCategory::WinTool => "Win.Tool",
            PuaCategory::WinTrojan => "Win.Trojan",
            PuaCategory::WinVirus => "Win.Virus",
        }
    }
}

impl FromStr for PuaCategory {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PuaCategory::ALL
            .iter()
            .copied()
            .find(|category| category.as_str() == s)
            .ok_or_else(|| ValidationError::InvalidPuaCategory(s.to_string()))
    }
}

impl TryFrom<String> for PuaCategory {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<PuaCategory> for String {
    fn from(value: PuaCategory) -> Self {
        value.as_str().to_string()
    }
}

impl Display for PuaCategory {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_every_category_parses_back() {
        for category in PuaCategory::ALL {
            assert_eq!(category.as_str().parse::<PuaCategory>().unwrap(), category);
        }
        let unique: HashSet<&str> = PuaCategory::ALL.iter().map(|c| c.as_str()).collect();
        assert_eq!(unique.len(), PuaCategory::ALL.len());
    }

    #[test]
    fn test_unknown_category_rejected() {
        let err = "Invalid.PUA".parse::<PuaCategory>().unwrap_err();
        assert!(matches!(err, ValidationError::InvalidPuaCategory(_)));
        assert!(serde_json::from_str::<PuaCategory>("\"Invalid.PUA\"").is_err());
        // Tags are case sensitive.
        assert!("win.packer".parse::<PuaCategory>().is_err());
    }

    #[test]
    fn test_serde_uses_dotted_names() {
        let json = serde_json::to_string(&vec![PuaCategory::AndrAdware, PuaCategory::WinPacker])
            .unwrap();
        assert_eq!(json, r#"["Andr.Adware","Win.Packer"]"#);
    }
}
