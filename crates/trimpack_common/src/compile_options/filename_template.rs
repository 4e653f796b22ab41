/// Output file name pattern with `[name]`, `[hash]`, `[ext]` and `[extname]` placeholders.
#[derive(Debug, Clone)]
pub struct FilenameTemplate {
  template: String,
}

impl FilenameTemplate {
  pub fn new(template: String) -> Self {
    Self { template }
  }

  /// `extension` is given without the leading dot.
  pub fn render(&self, name: &str, hash: Option<&str>, extension: Option<&str>) -> String {
    let mut rendered = self.template.replace("[name]", name);
    if let Some(hash) = hash {
      rendered = rendered.replace("[hash]", hash);
    }
    let extname = extension.map(|ext| format!(".{ext}")).unwrap_or_default();
    rendered.replace("[extname]", &extname).replace("[ext]", extension.unwrap_or_default())
  }
}

#[test]
fn test_render() {
  let template = FilenameTemplate::new("chunks/[name]-[hash].js".to_string());
  assert_eq!(template.render("shared", Some("abc123"), None), "chunks/shared-abc123.js");

  let template = FilenameTemplate::new("assets/[name]-[hash][extname]".to_string());
  assert_eq!(template.render("logo", Some("xyz"), Some("png")), "assets/logo-xyz.png");
  assert_eq!(template.render("LICENSE", Some("xyz"), None), "assets/LICENSE-xyz");
}
