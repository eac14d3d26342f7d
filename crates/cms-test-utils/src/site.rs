//! [`TestSite`] builder for content engine scenarios.

use std::fs;
use std::path::{Path, PathBuf};

use cms_core::RawEntryFile;
use cms_meta::{SiteSchema, load_site_config};
use tempfile::TempDir;

/// A bilingual blog: per-locale Markdown posts, a single-file root list and
/// an unlocalized pages collection
pub const BLOG_SITE: &str = r#"
media_folder: static/images
public_folder: /images
i18n:
  structure: multiple_files
  locales: [en, fr]
  default_locale: en
collections:
  - name: posts
    folder: content/posts
    i18n: true
    fields:
      - { name: title, i18n: true }
      - { name: summary, widget: text, i18n: translate }
      - { name: tags, widget: list, i18n: duplicate }
      - { name: cover, widget: image, i18n: duplicate }
      - { name: draft, widget: boolean, i18n: false }
      - { name: body, widget: markdown, i18n: true }
  - name: pages
    folder: content/pages
    fields:
      - { name: title }
      - { name: image, widget: image }
      - { name: body, widget: markdown }
  - name: settings
    i18n: true
    files:
      - name: menu
        file: data/menu.yml
        fields:
          - name: items
            widget: list
            root: true
"#;

/// A temporary site directory with a configuration file and content.
///
/// # Example
///
/// ```rust,no_run
/// use cms_test_utils::{BLOG_SITE, TestSite};
///
/// let site = TestSite::new(BLOG_SITE);
/// site.write("content/posts/hello.en.md", "---\ntitle: Hello\n---\n");
/// let schema = site.schema();
/// let files = site.raw_files(&schema);
/// ```
pub struct TestSite {
    temp_dir: TempDir,
}

impl TestSite {
    /// Create a site whose `config.yml` holds `config`
    pub fn new(config: &str) -> Self {
        let site = Self {
            temp_dir: TempDir::new().unwrap(),
        };
        site.write("config.yml", config);
        site
    }

    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn config_path(&self) -> PathBuf {
        self.root().join("config.yml")
    }

    /// Write `text` at `path` relative to the site root, creating parents
    pub fn write(&self, path: &str, text: &str) {
        let full_path = self.root().join(path);
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(full_path, text).unwrap();
    }

    /// Load the configuration through the regular loader
    pub fn schema(&self) -> SiteSchema {
        let config = load_site_config(&self.config_path())
            .unwrap_or_else(|e| panic!("TestSite::schema: invalid configuration: {e}"));
        SiteSchema::new(config).unwrap()
    }

    /// Every file under the site root that belongs to an entry folder, in
    /// path order
    pub fn raw_files(&self, schema: &SiteSchema) -> Vec<RawEntryFile> {
        let mut paths = Vec::new();
        collect_files(self.root(), self.root(), &mut paths);
        paths.sort();

        paths
            .into_iter()
            .filter_map(|path| {
                let folder = schema.entry_folder_for(&path)?.clone();
                let text = fs::read_to_string(self.root().join(&path)).ok()?;
                Some(RawEntryFile {
                    sha: format!("sha-{path}"),
                    path,
                    text,
                    folder,
                })
            })
            .collect()
    }

    /// Contents of the file at `path`
    ///
    /// # Panics
    /// Panics if the file cannot be read.
    pub fn read(&self, path: &str) -> String {
        let full_path = self.root().join(path);
        fs::read_to_string(&full_path)
            .unwrap_or_else(|_| panic!("Could not read file: {}", full_path.display()))
    }
}

fn collect_files(root: &Path, dir: &Path, paths: &mut Vec<String>) {
    for entry in fs::read_dir(dir).unwrap().flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_files(root, &path, paths);
        } else if let Ok(relative) = path.strip_prefix(root) {
            let relative = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect::<Vec<_>>()
                .join("/");
            paths.push(relative);
        }
    }
}
