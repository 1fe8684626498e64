//! Locale to encoding resolution for narrow command-line strings.
//!
//! A locale may be given as an encoding label (`windows-1251`, `cp1252`),
//! a POSIX locale with a codeset (`ru_RU.CP1251`) or a bare language tag
//! (`ru-RU`), which maps to the default ANSI code page of that language.

use crate::error::EncodingError;
use encoding_rs::{
    BIG5, EUC_KR, Encoding, GBK, SHIFT_JIS, UTF_8, WINDOWS_874, WINDOWS_1250, WINDOWS_1251,
    WINDOWS_1252, WINDOWS_1253, WINDOWS_1254, WINDOWS_1255, WINDOWS_1256, WINDOWS_1257,
    WINDOWS_1258,
};
use std::borrow::Cow;

const LOCALE_VARS: [&str; 3] = ["LC_ALL", "LC_CTYPE", "LANG"];

/// Resolve the encoding narrow arguments are stored in.
///
/// `None` suppresses re-encoding (input is already UTF-8). `Some("")` uses
/// the process locale from the environment. Returns `Ok(None)` whenever the
/// resolved encoding is UTF-8.
pub fn resolve(locale: Option<&str>) -> Result<Option<&'static Encoding>, EncodingError> {
    let encoding = match locale {
        None => return Ok(None),
        Some("") => environment_encoding()?,
        Some(name) => encoding_for_locale(name)
            .ok_or_else(|| EncodingError::UnknownLocale(name.to_string()))?,
    };
    tracing::trace!(encoding = encoding.name(), "resolved narrow argument encoding");
    Ok((encoding != UTF_8).then_some(encoding))
}

/// Decode one argument. `index` is only used for error reporting.
pub fn decode(
    bytes: &[u8],
    encoding: Option<&'static Encoding>,
    index: usize,
) -> Result<String, EncodingError> {
    match encoding {
        None => std::str::from_utf8(bytes)
            .map(str::to_string)
            .map_err(|_| EncodingError::InvalidUtf8 { index }),
        Some(encoding) => encoding
            .decode_without_bom_handling_and_without_replacement(bytes)
            .map(Cow::into_owned)
            .ok_or(EncodingError::Unmappable {
                index,
                encoding: encoding.name(),
            }),
    }
}

fn environment_encoding() -> Result<&'static Encoding, EncodingError> {
    let value = LOCALE_VARS
        .iter()
        .filter_map(|var| std::env::var(var).ok())
        .find(|value| !value.is_empty());

    match value.as_deref() {
        None | Some("C") | Some("POSIX") => Ok(UTF_8),
        Some(name) => {
            encoding_for_locale(name).ok_or_else(|| EncodingError::UnknownLocale(name.to_string()))
        }
    }
}

fn encoding_for_locale(name: &str) -> Option<&'static Encoding> {
    let name = name.split('@').next().unwrap_or(name);

    if let Some(encoding) = Encoding::for_label(name.as_bytes()) {
        return Some(encoding);
    }

    if let Some((language, codeset)) = name.split_once('.') {
        return codeset_encoding(codeset).or_else(|| language_encoding(language));
    }

    language_encoding(name)
}

fn codeset_encoding(codeset: &str) -> Option<&'static Encoding> {
    Encoding::for_label(codeset.as_bytes()).or_else(|| {
        // POSIX spells Windows code pages as `CP1251`, WHATWG wants `windows-1251`.
        let digits = codeset
            .strip_prefix("CP")
            .or_else(|| codeset.strip_prefix("cp"))?;
        Encoding::for_label(format!("windows-{digits}").as_bytes())
    })
}

fn language_encoding(tag: &str) -> Option<&'static Encoding> {
    let mut parts = tag.split(['-', '_']);
    let language = parts.next()?.to_ascii_lowercase();
    let region = parts.next().map(str::to_ascii_uppercase);

    let encoding = match language.as_str() {
        "ru" | "uk" | "be" | "bg" | "mk" | "sr" | "kk" | "ky" | "tt" | "mn" => WINDOWS_1251,
        "en" | "fr" | "de" | "es" | "it" | "pt" | "nl" | "da" | "sv" | "nb" | "nn" | "no"
        | "fi" | "is" | "ga" | "ca" | "eu" | "gl" | "af" | "id" | "ms" | "sw" | "fo" => {
            WINDOWS_1252
        }
        "pl" | "cs" | "sk" | "hu" | "hr" | "sl" | "ro" | "sq" | "bs" => WINDOWS_1250,
        "el" => WINDOWS_1253,
        "tr" | "az" | "uz" => WINDOWS_1254,
        "he" => WINDOWS_1255,
        "ar" | "fa" | "ur" => WINDOWS_1256,
        "et" | "lv" | "lt" => WINDOWS_1257,
        "vi" => WINDOWS_1258,
        "th" => WINDOWS_874,
        "ja" => SHIFT_JIS,
        "ko" => EUC_KR,
        "zh" => match region.as_deref() {
            Some("TW" | "HK" | "MO") => BIG5,
            _ => GBK,
        },
        _ => return None,
    };
    Some(encoding)
}
