use std::fs;

use dj_beat_drop::context::TemplateContext;
use dj_beat_drop::substitutor::{has_placeholders, substitute};
use tempfile::TempDir;

#[test]
fn test_substitute_tree() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    fs::create_dir_all(root.join("pkg")).unwrap();
    fs::write(root.join("a.py"), "name = '{{ app_name }}'\n").unwrap();
    fs::write(root.join("pkg/b.py"), "class {{ camel_case_app_name }}Config:\n    '{{ app_name }}'\n").unwrap();
    fs::write(root.join("pkg/other.txt"), "{{ unknown }} stays\n").unwrap();

    let context = TemplateContext::for_app("apps.blog", "blog");
    substitute(root, &context).unwrap();

    let a = fs::read_to_string(root.join("a.py")).unwrap();
    let b = fs::read_to_string(root.join("pkg/b.py")).unwrap();
    assert_eq!(a, "name = 'apps.blog'\n");
    assert_eq!(b, "class BlogConfig:\n    'apps.blog'\n");
    assert!(!has_placeholders(&a) && !has_placeholders(&b));
    assert_eq!(fs::read_to_string(root.join("pkg/other.txt")).unwrap(), "{{ unknown }} stays\n");

    // A second pass finds nothing left to replace.
    substitute(root, &context).unwrap();
    assert_eq!(fs::read_to_string(root.join("a.py")).unwrap(), a);
}

#[test]
fn test_substitute_skips_binary_files() {
    let temp_dir = TempDir::new().unwrap();
    let binary = [0xff, 0xfe, b'{', b'{', b' ', b'a', b' ', b'}', b'}', 0x00];
    fs::write(temp_dir.path().join("logo.png"), binary).unwrap();

    let mut context = TemplateContext::new();
    context.insert("a", "b");
    substitute(temp_dir.path(), &context).unwrap();

    assert_eq!(fs::read(temp_dir.path().join("logo.png")).unwrap(), binary);
}
