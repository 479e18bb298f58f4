//! Rewrites dependency paths in the project's configuration file.
//!
//! The configuration file is line oriented. For every resolved dependency a
//! line such as
//!
//! ```text
//! boost include dir: <the path to your boost include directory>
//! boost library dir x64: <the path to your boost library directory>
//! ```
//!
//! gets its value replaced by the dependency's `include_dir`,
//! `library32_dir` or `library64_dir`. Relative values are anchored at the
//! dependency's checkout directory.

use crate::deps::DependencyRecord;
use crate::error::ConfigError;
use colored::*;
use regex::Regex;
use std::fs;
use std::path::Path;

/// Record fields the configuration file knows about, in rewrite order.
pub const DIR_KINDS: [&str; 3] = ["include", "library32", "library64"];

/// Read `config_path`, rewrite lines for `records`, write it back.
///
/// Returns the number of lines changed.
pub fn update_configuration(
    config_path: &Path,
    root: &Path,
    records: &[DependencyRecord],
) -> Result<usize, ConfigError> {
    println!("{} Updating configuration", "⚙".cyan());

    let content = fs::read_to_string(config_path).map_err(|source| ConfigError::Read {
        path: config_path.to_path_buf(),
        source,
    })?;
    let mut lines: Vec<String> = content.lines().map(str::to_string).collect();

    let changed = update_configuration_lines(&mut lines, root, records);

    let mut out = String::with_capacity(content.len());
    for line in &lines {
        out.push_str(line);
        out.push('\n');
    }
    fs::write(config_path, out).map_err(|source| ConfigError::Write {
        path: config_path.to_path_buf(),
        source,
    })?;

    log::debug!("{} configuration lines rewritten", changed);
    Ok(changed)
}

pub fn update_configuration_lines(
    lines: &mut [String],
    root: &Path,
    records: &[DependencyRecord],
) -> usize {
    let mut changed = 0;
    for record in records {
        for kind in DIR_KINDS {
            let Some(value) = record.dir_field(kind) else {
                continue;
            };
            let path = resolve_dir(root, &record.target_dir, value);
            let key = line_key(&record.name, kind);
            changed += set_value(lines, &key, &path);
        }
    }
    changed
}

/// `"<name> <field> dir[ x64]"` for a record field kind.
pub fn line_key(name: &str, kind: &str) -> String {
    let (field, suffix) = if let Some(base) = kind.strip_suffix("64") {
        (base, " x64")
    } else if let Some(base) = kind.strip_suffix("32") {
        (base, "")
    } else {
        (kind, "")
    };
    format!("{} {} dir{}", name, field, suffix)
}

fn resolve_dir(root: &Path, target_dir: &Path, value: &str) -> String {
    let path = if Path::new(value).is_absolute() {
        value.to_string()
    } else {
        root.join(target_dir).join(value).to_string_lossy().into_owned()
    };
    path.replace('\\', "/")
}

fn set_value(lines: &mut [String], key: &str, value: &str) -> usize {
    let pattern = format!(r"^{}\s*:", regex::escape(key));
    let Ok(re) = Regex::new(&pattern) else {
        return 0;
    };

    let mut changed = 0;
    for line in lines.iter_mut() {
        if let Some(m) = re.find(line) {
            *line = format!("{} {}", &line[..m.end()], value);
            changed += 1;
        }
    }
    changed
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    const CONFIG: &str = "\
# paths to 3rd party libraries
catch include dir: <the path to your catch include directory>
boost include dir: <the path to your boost include directory>
boost library dir: <the path to your boost library directory>
boost library dir x64: <the path to your boost library directory>
build dir: ./build
";

    fn lines() -> Vec<String> {
        CONFIG.lines().map(str::to_string).collect()
    }

    fn boost() -> DependencyRecord {
        DependencyRecord {
            name: "boost".to_string(),
            target_dir: PathBuf::from("3rdParty/boost"),
            include_dir: Some(".".to_string()),
            library32_dir: Some("stage/lib".to_string()),
            library64_dir: Some("stage/lib64".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_line_key_suffixes() {
        assert_eq!(line_key("boost", "include"), "boost include dir");
        assert_eq!(line_key("boost", "library32"), "boost library dir");
        assert_eq!(line_key("boost", "library64"), "boost library dir x64");
    }

    #[test]
    fn test_relative_paths_are_anchored_at_target_dir() {
        let mut lines = lines();
        let changed = update_configuration_lines(&mut lines, Path::new("/work"), &[boost()]);

        assert_eq!(changed, 3);
        assert_eq!(lines[2], "boost include dir: /work/3rdParty/boost/.");
        assert_eq!(lines[3], "boost library dir: /work/3rdParty/boost/stage/lib");
        assert_eq!(lines[4], "boost library dir x64: /work/3rdParty/boost/stage/lib64");
    }

    #[test]
    fn test_other_lines_are_untouched() {
        let mut lines = lines();
        update_configuration_lines(&mut lines, Path::new("/work"), &[boost()]);
        assert_eq!(lines[0], "# paths to 3rd party libraries");
        assert_eq!(lines[1], "catch include dir: <the path to your catch include directory>");
        assert_eq!(lines[5], "build dir: ./build");
    }

    #[test]
    fn test_absolute_paths_are_kept_and_slashes_unified() {
        let abs = if cfg!(windows) {
            "C:\\libs\\catch\\single_include"
        } else {
            "/opt/catch\\single_include"
        };
        let catch = DependencyRecord {
            name: "catch".to_string(),
            target_dir: PathBuf::from("3rdParty/catch"),
            include_dir: Some(abs.to_string()),
            ..Default::default()
        };
        let mut lines = lines();
        update_configuration_lines(&mut lines, Path::new("/work"), &[catch]);
        assert_eq!(
            lines[1],
            format!("catch include dir: {}", abs.replace('\\', "/"))
        );
    }

    #[test]
    fn test_records_without_dir_fields_change_nothing() {
        let plain = DependencyRecord {
            name: "boost".to_string(),
            target_dir: PathBuf::from("3rdParty/boost"),
            ..Default::default()
        };
        let mut lines = lines();
        assert_eq!(update_configuration_lines(&mut lines, Path::new("/w"), &[plain]), 0);
        assert_eq!(lines.join("\n") + "\n", CONFIG);
    }

    #[test]
    fn test_update_configuration_rewrites_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.yaml");
        fs::write(&path, CONFIG).unwrap();

        let changed = update_configuration(&path, Path::new("/work"), &[boost()]).unwrap();

        assert_eq!(changed, 3);
        let written = fs::read_to_string(&path).unwrap();
        assert!(written.contains("boost library dir x64: /work/3rdParty/boost/stage/lib64\n"));
        assert!(written.ends_with("build dir: ./build\n"));
    }

    #[test]
    fn test_missing_configuration_file_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let err = update_configuration(&tmp.path().join("missing.yaml"), tmp.path(), &[boost()])
            .unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
