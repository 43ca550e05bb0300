//! Import path grammar (§6): `./…` and `../…` relative to the importing
//! file's directory, `host:<pkg>` for the host bridge. Ported from
//! `original_source/compiler/path.go`'s `ResolvePath`.

use std::path::{Path, PathBuf};

#[derive(Clone, Debug, PartialEq)]
pub enum ImportTarget {
    Host(String),
    Relative(PathBuf),
}

pub fn classify_import(importer_dir: &Path, raw: &str) -> Result<ImportTarget, String> {
    if let Some(pkg) = raw.strip_prefix("host:") {
        return Ok(ImportTarget::Host(pkg.to_string()));
    }
    if let Some(rest) = raw.strip_prefix("./") {
        return Ok(ImportTarget::Relative(normalize(importer_dir.join(rest))));
    }
    if raw.starts_with("../") {
        let mut current = importer_dir.to_path_buf();
        let mut rest = raw;
        while let Some(stripped) = rest.strip_prefix("../") {
            rest = stripped;
            current = current
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or(current);
        }
        return Ok(ImportTarget::Relative(normalize(current.join(rest))));
    }
    Err(format!("invalid import path '{raw}': must start with './', '../', or 'host:'"))
}

fn normalize(path: PathBuf) -> PathBuf {
    path.components().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_host_package() {
        let target = classify_import(Path::new("/proj/src"), "host:fmt").unwrap();
        assert_eq!(target, ImportTarget::Host("fmt".to_string()));
    }

    #[test]
    fn resolves_sibling_relative_path() {
        let target = classify_import(Path::new("/proj/src"), "./a.ns").unwrap();
        assert_eq!(target, ImportTarget::Relative(PathBuf::from("/proj/src/a.ns")));
    }

    #[test]
    fn resolves_parent_relative_path() {
        let target = classify_import(Path::new("/proj/src/pkg"), "../a.ns").unwrap();
        assert_eq!(target, ImportTarget::Relative(PathBuf::from("/proj/src/a.ns")));
    }

    #[test]
    fn rejects_other_forms() {
        assert!(classify_import(Path::new("/proj/src"), "fmt").is_err());
    }
}
