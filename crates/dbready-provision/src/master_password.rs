//! Master password lookup in the application server's INI config file.

use std::path::Path;

use ini::{Ini, ParseOption};

use crate::error::{ProvisionError, Result};

const KEY: &str = "admin_passwd";

/// Read `admin_passwd` from `path`.
///
/// A key outside any section wins. Otherwise the first section in file order
/// that carries the key is used. Values come back verbatim: quotes and
/// backslashes are part of the password.
pub fn read_master_password(path: impl AsRef<Path>) -> Result<String> {
    let path = path.as_ref();
    let path_label = path.display().to_string();

    if !path.exists() {
        return Err(ProvisionError::ConfigFileNotFound(path_label));
    }

    let content = std::fs::read_to_string(path).map_err(|source| ProvisionError::Io {
        path: path_label.clone(),
        source,
    })?;

    let password = parse_master_password(&content)
        .map_err(|source| ProvisionError::Parse {
            path: path_label.clone(),
            source,
        })?
        .ok_or_else(|| ProvisionError::MasterPasswordMissing(path_label.clone()))?;

    tracing::debug!(path = %path_label, "Loaded master password");
    Ok(password)
}

fn parse_master_password(content: &str) -> std::result::Result<Option<String>, ini::ParseError> {
    let options = ParseOption {
        enabled_quote: false,
        enabled_escape: false,
        ..ParseOption::default()
    };
    let conf = Ini::load_from_str_opt(content, options)?;

    if let Some(password) = conf.general_section().get(KEY) {
        return Ok(Some(password.to_owned()));
    }

    Ok(conf
        .iter()
        .filter(|(section, _)| section.is_some())
        .find_map(|(_, props)| props.get(KEY))
        .map(str::to_owned))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn write_conf(name: &str, content: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "dbready-{}-{name}.conf",
            std::process::id()
        ));
        std::fs::write(&path, content).expect("temp dir should be writable");
        path
    }

    #[test]
    fn test_reads_sectioned_file() {
        let path = write_conf(
            "sectioned",
            "[options]\ndb_host = db\nadmin_passwd = s3cret\nhttp_port = 8069\n",
        );
        assert_eq!(read_master_password(&path).unwrap(), "s3cret");
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_reads_file_without_sections() {
        let path = write_conf("flat", "admin_passwd = flat-pass\ndb_port = 5432\n");
        assert_eq!(read_master_password(&path).unwrap(), "flat-pass");
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_finds_key_in_later_section() {
        let path = write_conf(
            "later",
            "[logging]\nlevel = info\n\n[options]\nadmin_passwd = deep\n",
        );
        assert_eq!(read_master_password(&path).unwrap(), "deep");
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_first_section_in_file_order_wins() {
        let password = parse_master_password(
            "[options]\nadmin_passwd = from_options\n\n[alpha]\nadmin_passwd = from_alpha\n",
        )
        .unwrap();
        assert_eq!(password.as_deref(), Some("from_options"));
    }

    #[test]
    fn test_backslashes_are_kept() {
        let password = parse_master_password("[options]\nadmin_passwd = pa\\ss\n").unwrap();
        assert_eq!(password.as_deref(), Some("pa\\ss"));
    }

    #[test]
    fn test_quotes_are_kept() {
        let password = parse_master_password("[options]\nadmin_passwd = \"quoted\"\n").unwrap();
        assert_eq!(password.as_deref(), Some("\"quoted\""));
    }

    #[test]
    fn test_missing_key() {
        let path = write_conf("nokey", "[options]\ndb_host = db\n");
        assert!(matches!(
            read_master_password(&path),
            Err(ProvisionError::MasterPasswordMissing(_))
        ));
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_missing_file() {
        let path = std::env::temp_dir().join("dbready-does-not-exist.conf");
        let err = read_master_password(&path).unwrap_err();
        assert!(matches!(err, ProvisionError::ConfigFileNotFound(_)));
        assert!(err.to_string().contains("does not exist"));
    }
}
