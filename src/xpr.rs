use anyhow::{bail, Context, Result};
use quick_xml::{
    events::{attributes::Attribute, BytesDecl, BytesStart, BytesText, Event},
    Reader, Writer,
};
use std::borrow::Cow;
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

use crate::error::FixError;
use crate::output;

/// Attribute of the root element holding the project's absolute location
pub const PATH_ATTRIBUTE: &str = "Path";

/// Outcome of a successful [`correct_path`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Correction {
    /// The stored path already matched; the file was not touched
    Unchanged { path: String },
    /// The stored path was stale and the file was rewritten
    Updated { old: String, new: String },
}

/// Make the `Path` attribute of `file` match the file's real location.
///
/// Reads the project, compares its stored path with the canonical path of
/// `file` and rewrites the whole document when they differ. A failed write
/// is reported as [`FixError::Write`] and leaves the previous content on disk.
pub fn correct_path(file: &Path) -> Result<Correction> {
    let expected = expected_project_path(file)?;
    output::info(format!("expected project path: \t{}", expected));

    let content =
        fs::read_to_string(file).with_context(|| format!("Failed to read {}", file.display()))?;
    let actual = read_project_path(&content)
        .with_context(|| format!("Failed to read project path from {}", file.display()))?;
    output::info(format!("actual project path: \t{}", actual));

    if actual == expected {
        output::info("project path appears correct, no changes made");
        return Ok(Correction::Unchanged { path: expected });
    }

    let updated = set_project_path(&content, &expected)
        .with_context(|| format!("Failed to update project path in {}", file.display()))?;

    write_atomically(file, updated.as_bytes()).map_err(|err| FixError::Write {
        path: file.to_path_buf(),
        message: format!("{:#}", err),
    })?;
    output::info("project path updated, changes saved");

    Ok(Correction::Updated {
        old: actual,
        new: expected,
    })
}

/// Canonical absolute path of `file`, with forward slashes as Vivado expects
pub fn expected_project_path(file: &Path) -> Result<String> {
    let canonical = fs::canonicalize(file)
        .with_context(|| format!("Failed to resolve {}", file.display()))?;
    Ok(normalize_separators(&canonical.to_string_lossy()))
}

/// Turn a native path string into Vivado's forward-slash form
pub fn normalize_separators(path: &str) -> String {
    let path = path.strip_prefix(r"\\?\").unwrap_or(path);
    path.replace('\\', "/")
}

/// Value of the root element's `Path` attribute
pub fn read_project_path(xml: &str) -> Result<String> {
    let mut reader = Reader::from_str(strip_bom(xml));

    loop {
        match reader.read_event().context("Malformed project XML")? {
            Event::Start(e) | Event::Empty(e) => {
                let Some(attr) = e.try_get_attribute(PATH_ATTRIBUTE)? else {
                    bail!(
                        "root element <{}> has no {} attribute",
                        String::from_utf8_lossy(e.name().as_ref()),
                        PATH_ATTRIBUTE
                    );
                };
                return Ok(attr.unescape_value()?.into_owned());
            }
            Event::Eof => bail!("project XML has no root element"),
            _ => {}
        }
    }
}

/// Rewrite the root element's `Path` attribute, streaming everything else through.
///
/// The result always starts with an XML declaration: an existing one is kept,
/// otherwise a UTF-8 declaration is inserted ahead of the root element.
pub fn set_project_path(xml: &str, new_path: &str) -> Result<String> {
    let mut reader = Reader::from_str(strip_bom(xml));
    let mut writer = Writer::new(Vec::new());
    let mut seen_decl = false;
    let mut seen_root = false;

    loop {
        match reader.read_event().context("Malformed project XML")? {
            Event::Eof => break,

            Event::Decl(decl) => {
                seen_decl = true;
                writer.write_event(Event::Decl(decl))?;
            }

            Event::Start(e) if !seen_root => {
                seen_root = true;
                if !seen_decl {
                    write_declaration(&mut writer)?;
                }
                writer.write_event(Event::Start(with_project_path(&e, new_path)?))?;
            }

            Event::Empty(e) if !seen_root => {
                seen_root = true;
                if !seen_decl {
                    write_declaration(&mut writer)?;
                }
                writer.write_event(Event::Empty(with_project_path(&e, new_path)?))?;
            }

            e => writer.write_event(e)?,
        }
    }

    if !seen_root {
        bail!("project XML has no root element");
    }

    Ok(String::from_utf8(writer.into_inner())?)
}

fn with_project_path(e: &BytesStart, new_path: &str) -> Result<BytesStart<'static>> {
    let mut elem = e.to_owned();
    elem.clear_attributes();

    let mut found = false;
    for attr in e.attributes() {
        let attr = attr?;
        if attr.key.as_ref() == PATH_ATTRIBUTE.as_bytes() {
            elem.push_attribute((PATH_ATTRIBUTE, new_path));
            found = true;
        } else {
            elem.push_attribute(double_quoted(attr));
        }
    }

    if !found {
        bail!(
            "root element <{}> has no {} attribute",
            String::from_utf8_lossy(e.name().as_ref()),
            PATH_ATTRIBUTE
        );
    }
    Ok(elem)
}

/// Attributes are re-emitted inside double quotes, so a raw `"` taken from a
/// single-quoted value has to become `&quot;`.
fn double_quoted(attr: Attribute) -> Attribute {
    if !attr.value.contains(&b'"') {
        return attr;
    }

    let mut value = Vec::with_capacity(attr.value.len() + 8);
    for &b in attr.value.iter() {
        if b == b'"' {
            value.extend_from_slice(b"&quot;");
        } else {
            value.push(b);
        }
    }
    Attribute {
        key: attr.key,
        value: Cow::Owned(value),
    }
}

fn write_declaration(writer: &mut Writer<Vec<u8>>) -> Result<()> {
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    writer.write_event(Event::Text(BytesText::new("\n")))?;
    Ok(())
}

fn strip_bom(xml: &str) -> &str {
    xml.strip_prefix('\u{feff}').unwrap_or(xml)
}

/// Replace `path` in one step so readers see either the old or the new file.
/// A symlinked `path` is written through to its target.
fn write_atomically(path: &Path, contents: &[u8]) -> Result<()> {
    let real = fs::canonicalize(path)
        .with_context(|| format!("Failed to resolve {}", path.display()))?;
    let dir = real.parent().unwrap_or_else(|| Path::new("."));

    let mut tmp = NamedTempFile::new_in(dir)
        .with_context(|| format!("Failed to create temporary file in {}", dir.display()))?;
    tmp.write_all(contents)?;
    tmp.as_file().sync_all()?;

    // Keep the project's permissions rather than the temp file's 0600
    let metadata = fs::metadata(&real)?;
    fs::set_permissions(tmp.path(), metadata.permissions())?;

    tmp.persist(&real)
        .with_context(|| format!("Failed to replace {}", real.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<!-- Product Version: Vivado v2017.4 (64-bit)              -->
<!--                                                         -->
<!-- Copyright 1986-2017 Xilinx, Inc. All Rights Reserved.   -->

<Project Version="7" Minor="17" Path="/old/location/design.xpr">
  <DefaultLaunch Dir="$PRUNDIR"/>
  <Configuration>
    <Option Name="Id" Val="a1b2c3"/>
    <Option Name="Part" Val="xc7a35ticsg324-1L"/>
  </Configuration>
</Project>
"#;

    fn write_project(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_read_project_path() {
        assert_eq!(read_project_path(SAMPLE).unwrap(), "/old/location/design.xpr");
    }

    #[test]
    fn test_read_project_path_unescapes() {
        let xml = r#"<Project Path="/tmp/a&amp;b/design.xpr"/>"#;
        assert_eq!(read_project_path(xml).unwrap(), "/tmp/a&b/design.xpr");
    }

    #[test]
    fn test_read_project_path_missing_attribute() {
        let xml = r#"<Project Version="7"><Child Path="/nested"/></Project>"#;
        let err = read_project_path(xml).unwrap_err();
        assert!(err.to_string().contains("has no Path attribute"));
    }

    #[test]
    fn test_read_project_path_no_root() {
        assert!(read_project_path("<?xml version=\"1.0\"?>\n").is_err());
    }

    #[test]
    fn test_read_project_path_malformed() {
        assert!(read_project_path("<Project Path=\"/a>").is_err());
    }

    #[test]
    fn test_set_project_path_only_touches_root_path() {
        let updated = set_project_path(SAMPLE, "/current/location/design.xpr").unwrap();
        let expected = SAMPLE.replace("/old/location/design.xpr", "/current/location/design.xpr");
        assert_eq!(updated, expected);
    }

    #[test]
    fn test_set_project_path_leaves_nested_path_attributes() {
        let xml = "<?xml version=\"1.0\"?>\n<Project Path=\"/old\"><File Path=\"$PSRCDIR/top.v\"/></Project>";
        let updated = set_project_path(xml, "/new").unwrap();
        assert_eq!(
            updated,
            "<?xml version=\"1.0\"?>\n<Project Path=\"/new\"><File Path=\"$PSRCDIR/top.v\"/></Project>"
        );
    }

    #[test]
    fn test_set_project_path_inserts_declaration() {
        let updated = set_project_path(r#"<Project Path="/old"/>"#, "/new").unwrap();
        assert!(updated.starts_with(r#"<?xml version="1.0" encoding="UTF-8"?>"#));
        assert!(updated.ends_with(r#"<Project Path="/new"/>"#));
    }

    #[test]
    fn test_set_project_path_escapes_value() {
        let updated = set_project_path(r#"<Project Path="/old"/>"#, "/a&b/design.xpr").unwrap();
        assert!(updated.contains(r#"Path="/a&amp;b/design.xpr""#));
        assert_eq!(read_project_path(&updated).unwrap(), "/a&b/design.xpr");
    }

    #[test]
    fn test_set_project_path_tolerates_bom() {
        let xml = format!("\u{feff}{}", SAMPLE);
        let updated = set_project_path(&xml, "/new/design.xpr").unwrap();
        assert!(updated.starts_with("<?xml"));
        assert_eq!(read_project_path(&updated).unwrap(), "/new/design.xpr");
    }

    #[test]
    fn test_normalize_separators() {
        assert_eq!(normalize_separators(r"C:\old\path"), "C:/old/path");
        assert_eq!(normalize_separators(r"\\?\C:\work\design.xpr"), "C:/work/design.xpr");
        assert_eq!(normalize_separators("/already/fine"), "/already/fine");
    }

    #[test]
    fn test_correct_path_rewrites_stale_path() {
        let dir = TempDir::new().unwrap();
        let file = write_project(&dir, "design.xpr", SAMPLE);
        let expected = expected_project_path(&file).unwrap();

        let result = correct_path(&file).unwrap();

        assert_eq!(
            result,
            Correction::Updated {
                old: "/old/location/design.xpr".to_string(),
                new: expected.clone(),
            }
        );
        let content = fs::read_to_string(&file).unwrap();
        assert_eq!(read_project_path(&content).unwrap(), expected);
        assert!(content.contains("<Option Name=\"Part\" Val=\"xc7a35ticsg324-1L\"/>"));
    }

    #[test]
    fn test_correct_path_windows_style_stored_path() {
        let dir = TempDir::new().unwrap();
        let file = write_project(
            &dir,
            "design.xpr",
            r#"<?xml version="1.0"?><Project Path="C:\old\path\design.xpr"/>"#,
        );

        correct_path(&file).unwrap();

        let stored = read_project_path(&fs::read_to_string(&file).unwrap()).unwrap();
        assert_eq!(stored, expected_project_path(&file).unwrap());
        assert!(!stored.contains('\\'));
    }

    #[test]
    fn test_correct_path_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let file = write_project(&dir, "design.xpr", SAMPLE);

        assert!(matches!(correct_path(&file).unwrap(), Correction::Updated { .. }));
        let after_first = fs::read(&file).unwrap();

        assert!(matches!(correct_path(&file).unwrap(), Correction::Unchanged { .. }));
        assert_eq!(fs::read(&file).unwrap(), after_first);
    }

    #[test]
    fn test_correct_path_leaves_correct_file_untouched() {
        let dir = TempDir::new().unwrap();
        let file = write_project(&dir, "design.xpr", "");
        let expected = expected_project_path(&file).unwrap();
        let content = format!(
            "<?xml version='1.0' encoding='utf-8'?>\n<Project  Version='7' Path=\"{}\"></Project>",
            expected
        );
        fs::write(&file, &content).unwrap();

        let result = correct_path(&file).unwrap();

        assert_eq!(result, Correction::Unchanged { path: expected });
        assert_eq!(fs::read_to_string(&file).unwrap(), content);
    }

    #[test]
    fn test_correct_path_relative_to_symlinked_dir() {
        let dir = TempDir::new().unwrap();
        let real = dir.path().join("real");
        fs::create_dir(&real).unwrap();
        let file = write_project(&dir, "real/design.xpr", SAMPLE);

        #[cfg(unix)]
        {
            let link = dir.path().join("link");
            std::os::unix::fs::symlink(&real, &link).unwrap();
            correct_path(&link.join("design.xpr")).unwrap();

            let stored = read_project_path(&fs::read_to_string(&file).unwrap()).unwrap();
            assert_eq!(stored, expected_project_path(&file).unwrap());
            assert!(!stored.contains("/link/"));
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_correct_path_writes_through_symlinked_file() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("store")).unwrap();
        let target = write_project(&dir, "store/design.xpr", SAMPLE);
        let link = dir.path().join("design.xpr");
        std::os::unix::fs::symlink(&target, &link).unwrap();

        correct_path(&link).unwrap();

        assert!(fs::symlink_metadata(&link).unwrap().file_type().is_symlink());
        let stored = read_project_path(&fs::read_to_string(&target).unwrap()).unwrap();
        assert_eq!(stored, expected_project_path(&link).unwrap());
        assert_eq!(stored, expected_project_path(&target).unwrap());
    }

    #[test]
    fn test_set_project_path_single_quoted_value_with_double_quote() {
        let xml = r#"<Project Name='a"b' Title='plain' Path="/old"/>"#;

        let updated = set_project_path(xml, "/new").unwrap();

        assert_eq!(
            updated,
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
             <Project Name=\"a&quot;b\" Title=\"plain\" Path=\"/new\"/>"
        );
        assert_eq!(read_project_path(&updated).unwrap(), "/new");
    }

    #[cfg(unix)]
    #[test]
    fn test_correct_path_write_failure_keeps_file() {
        use crate::error::{exit_code, EXIT_UPDATE_FAILED};
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let project_dir = dir.path().join("locked");
        fs::create_dir(&project_dir).unwrap();
        let file = write_project(&dir, "locked/design.xpr", SAMPLE);
        fs::set_permissions(&project_dir, fs::Permissions::from_mode(0o555)).unwrap();

        // root ignores directory permissions
        if fs::write(project_dir.join("write-check"), "").is_ok() {
            fs::set_permissions(&project_dir, fs::Permissions::from_mode(0o755)).unwrap();
            return;
        }

        let result = correct_path(&file);
        fs::set_permissions(&project_dir, fs::Permissions::from_mode(0o755)).unwrap();

        let err = result.unwrap_err();
        assert!(matches!(err.downcast_ref::<FixError>(), Some(FixError::Write { .. })));
        assert_eq!(exit_code(&err), EXIT_UPDATE_FAILED);
        assert_eq!(fs::read_to_string(&file).unwrap(), SAMPLE);
    }

    #[test]
    fn test_correct_path_parse_error_leaves_file() {
        let dir = TempDir::new().unwrap();
        let file = write_project(&dir, "design.xpr", "<Project Version=\"7\"/>");

        let err = correct_path(&file).unwrap_err();

        assert!(err.downcast_ref::<FixError>().is_none());
        assert_eq!(fs::read_to_string(&file).unwrap(), "<Project Version=\"7\"/>");
    }

    #[cfg(unix)]
    #[test]
    fn test_correct_path_keeps_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let file = write_project(&dir, "design.xpr", SAMPLE);
        fs::set_permissions(&file, fs::Permissions::from_mode(0o644)).unwrap();

        correct_path(&file).unwrap();

        let mode = fs::metadata(&file).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o644);
    }
}
