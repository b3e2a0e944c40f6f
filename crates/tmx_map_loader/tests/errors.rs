use std::path::Path;
use tmx_map_core::ErrorKind;
use tmx_map_loader::{parse_map_from_str, FsResourceLoader, LoadError, LoaderConfig, TmxLoader};

const TILESET: &str = r#"<tileset firstgid="1" name="t" tilewidth="8" tileheight="8" tilecount="4" columns="2"><image source="t.png"/></tileset>"#;

fn map(body: &str) -> String {
    format!(
        r#"<map version="1.2" orientation="orthogonal" width="2" height="1" tilewidth="8" tileheight="8">
 {TILESET}
 {body}
</map>"#
    )
}

fn kind(source: &str) -> ErrorKind {
    parse_map_from_str(source).unwrap_err().kind()
}

#[test]
fn missing_fields() {
    assert_eq!(
        kind(r#"<map version="1.2" orientation="orthogonal" height="1" tilewidth="8" tileheight="8"/>"#),
        ErrorKind::MissingField
    );
    assert_eq!(kind(&map(r#"<layer id="1" width="2"><data encoding="csv">0,0</data></layer>"#)), ErrorKind::MissingField);
    assert_eq!(kind(&map(r#"<layer id="1" width="2" height="1"/>"#)), ErrorKind::MissingField);
}

#[test]
fn malformed_fields() {
    assert_eq!(
        kind(r#"<map version="1.2" orientation="orthogonal" width="two" height="1" tilewidth="8" tileheight="8"/>"#),
        ErrorKind::MalformedField
    );
    assert_eq!(
        kind(&map(r#"<layer id="1" width="2" height="1"><data encoding="csv">0,x</data></layer>"#)),
        ErrorKind::MalformedField
    );
    assert_eq!(
        kind(&map(r#"<layer id="1" width="2" height="1" visible="maybe"><data encoding="csv">0,0</data></layer>"#)),
        ErrorKind::MalformedField
    );
    assert_eq!(kind("<map"), ErrorKind::MalformedField);
}

#[test]
fn unsupported_features() {
    for body in [
        r#"<layer id="1" width="2" height="1"><data encoding="base64">AAAAAAAAAAA=</data></layer>"#,
        r#"<objectgroup id="1" draworder="topdown"/>"#,
        r#"<objectgroup id="1"><object id="1" template="enemy.tx"/></objectgroup>"#,
    ] {
        assert_eq!(kind(&map(body)), ErrorKind::UnsupportedFeature, "{body}");
    }
}

#[test]
fn unresolvable_references() {
    assert_eq!(
        kind(&map(r#"<layer id="1" width="2" height="1"><data encoding="csv">0,5</data></layer>"#)),
        ErrorKind::UnresolvableReference
    );

    let tmp = tempfile::tempdir().unwrap();
    let loader = TmxLoader::new(FsResourceLoader::new());
    let err = loader.load_map("nowhere.tmx", tmp.path()).unwrap_err();
    assert!(matches!(err, LoadError::Io { .. }));
    assert_eq!(err.kind(), ErrorKind::UnresolvableReference);
}

#[test]
fn structural_violations() {
    let late_tileset = format!(
        r#"<map version="1.2" orientation="orthogonal" width="1" height="1" tilewidth="8" tileheight="8">
 <layer id="1" width="1" height="1"><data encoding="csv">0</data></layer>
 {TILESET}
</map>"#
    );
    assert_eq!(kind(&late_tileset), ErrorKind::StructuralViolation);
    assert_eq!(kind(&map("<unknown/>")), ErrorKind::StructuralViolation);
    assert_eq!(
        kind(&map(r#"<objectgroup id="1"><object id="1"><polygon points="0,0 1,1"/></object></objectgroup>"#)),
        ErrorKind::StructuralViolation
    );
}

#[test]
fn error_names_location() {
    let err = parse_map_from_str(&map(
        r#"<layer id="1" width="2" height="1"/><layer id="2" width="2" height="1"><data encoding="csv">0,9</data></layer>"#,
    ))
    .unwrap_err();
    // The first layer fails before the second is reached
    assert!(err.to_string().starts_with("map[0]:layer[0]:"), "{err}");

    let err = parse_map_from_str(&map(
        r#"<layer id="1" width="2" height="1"><data encoding="csv">0,0</data></layer><layer id="2" width="2" height="1"><data encoding="csv">0,9</data></layer>"#,
    ))
    .unwrap_err();
    assert_eq!(err.to_string(), "map[0]:layer[1]:data[0]: Unknown tile gid 9");
}

#[test]
fn config_file_drives_loader() {
    let tmp = tempfile::tempdir().unwrap();
    let config_path = tmp.path().join("tmx.toml");
    std::fs::write(&config_path, "[loader]\nsupported_version = \"1.1\"\n").unwrap();
    let config = LoaderConfig::load(&config_path).unwrap();

    let loader = TmxLoader::with_config(FsResourceLoader::new(), config);
    let err = loader.parse_map_str(&map(""), Path::new("")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnsupportedFeature);

    let source = map("").replace(r#"version="1.2""#, r#"version="1.1""#);
    assert!(loader.parse_map_str(&source, Path::new("")).is_ok());
}
