//! End to end: decode, accessors and in-place edits through the public api

use hconf::{BoolValue, Error, FieldRef, HolderRef, Int64Value, StringSliceValue, StringValue};
use pretty_assertions::assert_eq;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

#[derive(Debug, Default, PartialEq)]
struct Foo {
    screensize: StringValue,
    likes_cats: BoolValue,
    likes_dogs: BoolValue,
    friends: StringSliceValue,
    age: Int64Value,
}

hconf::schema! {
    Foo {
        values {
            "screensize" => screensize,
            "likes_cats" => likes_cats,
            "likes_dogs" => likes_dogs,
            "friends" => friends,
            "age" => age,
        }
    }
}

#[derive(Debug, Default, PartialEq)]
struct MyConf {
    foo: Foo,
    bar: Foo,
}

hconf::schema! {
    MyConf {
        sections { "foo" => foo, "bar" => bar }
    }
}

const CONF: &str = r#"# preferences
section "foo" {
  screensize = "hello world"
  likes_cats = true
  likes_dogs = false # really
  friends = ["alice", "bob"]
}
"#;

fn write_conf(dir: &TempDir) -> PathBuf {
    let path = dir.path().join("app.conf");
    fs::write(&path, CONF).unwrap();
    path
}

fn load(path: &Path) -> MyConf {
    let mut conf = MyConf::default();
    hconf::decode_file(&mut conf, path).unwrap();
    conf
}

#[test]
fn decode_full_section() {
    let dir = TempDir::new().unwrap();
    let conf = load(&write_conf(&dir));

    assert_eq!(conf.foo.screensize.value(), "hello world");
    assert!(conf.foo.likes_cats.get());
    assert!(conf.foo.likes_cats.is_set());
    assert!(!conf.foo.likes_dogs.get());
    assert!(conf.foo.likes_dogs.is_set());
    assert_eq!(conf.foo.friends.value(), &["alice", "bob"]);
}

#[test]
fn fields_not_mentioned_stay_unset() {
    let mut conf = MyConf::default();
    hconf::decode(
        &mut conf,
        "cats.conf",
        b"section \"foo\" {\n  likes_cats = true\n}\n",
    )
    .unwrap();

    assert!(conf.foo.likes_cats.is_set());
    assert!(!conf.foo.likes_dogs.is_set());
    assert!(!conf.foo.age.is_set());
    assert_eq!(conf.foo.age.get(), 0);
    assert_eq!(conf.bar, Foo::default());
}

#[test]
fn edit_existing_section() {
    let dir = TempDir::new().unwrap();
    let path = write_conf(&dir);

    hconf::edit_and_save(&path, "foo", "screensize", "giant").unwrap();
    hconf::edit_and_save(&path, "foo", "friends", ["marco", "polo", "charlie"]).unwrap();

    let conf = load(&path);
    assert_eq!(conf.foo.screensize.value(), "giant");
    assert_eq!(conf.bar.screensize.value(), "");
    assert_eq!(conf.foo.friends.value(), &["marco", "polo", "charlie"]);

    let content = fs::read_to_string(&path).unwrap();
    assert!(content.starts_with("# preferences\n"));
    assert!(content.contains("likes_dogs = false # really"));
}

#[test]
fn edit_creates_missing_section() {
    let dir = TempDir::new().unwrap();
    let path = write_conf(&dir);

    hconf::edit_and_save(&path, "bar", "screensize", "giant").unwrap();

    let conf = load(&path);
    assert_eq!(conf.foo.screensize.value(), "hello world");
    assert_eq!(conf.bar.screensize.value(), "giant");
    assert!(fs::read_to_string(&path).unwrap().starts_with(CONF));
}

#[test]
fn edits_are_idempotent() {
    let dir = TempDir::new().unwrap();
    let path = write_conf(&dir);

    hconf::edit_and_save(&path, "bar", "age", 7).unwrap();
    let first = fs::read_to_string(&path).unwrap();

    hconf::edit_and_save(&path, "bar", "age", 7).unwrap();
    assert_eq!(fs::read_to_string(&path).unwrap(), first);
}

#[test]
fn edit_missing_file_and_directory() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("app.conf");

    hconf::edit_and_save(&path, "foo", "likes_cats", true).unwrap();

    let conf = load(&path);
    assert!(conf.foo.likes_cats.get());
    assert!(!conf.foo.likes_dogs.is_set());
}

#[test]
fn set_stays_in_memory() {
    let dir = TempDir::new().unwrap();
    let path = write_conf(&dir);
    let mut conf = load(&path);

    hconf::set(&mut conf, "foo", "screensize", "sunset").unwrap();

    assert_eq!(conf.foo.screensize.value(), "sunset");
    assert_eq!(conf.bar.screensize.value(), "");
    assert_eq!(fs::read_to_string(&path).unwrap(), CONF);
}

#[test]
fn get_reports_source() {
    let dir = TempDir::new().unwrap();
    let path = write_conf(&dir);
    let conf = load(&path);

    let (field, position) = hconf::get(&conf, "foo", "likes_cats").unwrap();
    assert_eq!(field, FieldRef::Holder(HolderRef::Bool(&conf.foo.likes_cats)));
    assert_eq!(position.filename.as_deref(), Some(path.as_path()));
    assert_eq!(position.line, 4);
}

#[test]
fn errors_are_located() {
    let mut conf = MyConf::default();
    let err = hconf::decode(
        &mut conf,
        "app.conf",
        b"section \"foo\" {\n  age = \"old\"\n}\n",
    )
    .expect_err("must error");

    assert!(matches!(err, Error::TypeMismatch { .. }));
    assert!(err.to_string().starts_with("app.conf:2:"), "{err}");
}

#[test]
fn edit_then_decode_roundtrip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("app.conf");

    hconf::edit_and_save(&path, "foo", "screensize", "large").unwrap();
    hconf::edit_and_save(&path, "foo", "age", 42i64).unwrap();
    hconf::edit_and_save(&path, "bar", "likes_dogs", false).unwrap();

    let conf = load(&path);
    assert_eq!(conf.foo.screensize.value(), "large");
    assert_eq!(conf.foo.age.get(), 42);
    assert!(conf.bar.likes_dogs.is_set());
    assert!(!conf.bar.likes_dogs.get());
}
