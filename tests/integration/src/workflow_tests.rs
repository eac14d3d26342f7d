//! End-to-end tests of the editing workflow
//!
//! Each test walks the full flow against a site on disk: configuration
//! loading -> entry assembly -> draft editing -> saving -> asset moves.

use cms_content::FormatParser;
use cms_content::path::KeyPath;
use cms_core::{
    Asset, AssetMoveContext, Backend, ChangeAction, CommitType, CopyOptions, CrossLocaleSync, Draft,
    DraftSession, DynamicValues, Entry, EntryAssembler, MoveAction, MovingAsset,
    NotificationKind, Translation, move_assets, saving_entry_data,
};
use cms_meta::SiteSchema;
use cms_test_utils::{
    BLOG_SITE, RecordingBackend, ScriptedCredentials, ScriptedTranslator, TestSite,
};
use pretty_assertions::assert_eq;
use serde_json::json;

/// A site with one bilingual post, one page and the menu
fn setup_site() -> TestSite {
    let site = TestSite::new(BLOG_SITE);
    site.write(
        "content/posts/hello.en.md",
        "---\ntitle: Hello\nsummary: Short\ntags: [news]\ncover: /images/logo.png\n---\nHello world\n",
    );
    site.write("content/posts/hello.fr.md", "---\ntitle: Bonjour\n---\n");
    site.write(
        "content/pages/about.md",
        "---\ntitle: About\nimage: /images/logo.png\n---\n![logo](/images/logo.png)\n",
    );
    site.write("data/menu.yml", "en:\n  - Home\nfr:\n  - Accueil\n");
    site.write("static/images/logo.png", "PNG");
    site
}

fn assemble(site: &TestSite, schema: &SiteSchema) -> Vec<Entry> {
    let files = site.raw_files(schema);
    let result = EntryAssembler::new(schema, &FormatParser::new()).assemble(&files);
    assert!(result.errors.is_empty(), "parse errors: {:?}", result.errors);
    result.entries
}

fn find<'a>(entries: &'a [Entry], slug: &str) -> &'a Entry {
    entries
        .iter()
        .find(|entry| entry.slug == slug)
        .unwrap_or_else(|| panic!("no entry {slug}"))
}

fn key(path: &str) -> KeyPath {
    KeyPath::parse(path)
}

#[test]
fn test_assemble_site_from_disk() {
    let site = setup_site();
    let schema = site.schema();
    let entries = assemble(&site, &schema);

    let found: Vec<_> = entries
        .iter()
        .map(|e| (e.collection_name.as_str(), e.slug.as_str()))
        .collect();
    assert_eq!(
        found,
        vec![("pages", "about"), ("posts", "hello"), ("settings", "menu")]
    );

    let post = find(&entries, "hello");
    assert_eq!(post.locales.len(), 2);
    assert_eq!(post.locales["fr"].content[&key("title")], json!("Bonjour"));

    let menu = find(&entries, "menu");
    assert_eq!(menu.locales["fr"].content[&key("items.0")], json!("Accueil"));
}

#[tokio::test]
async fn test_translate_and_save_post() {
    let site = setup_site();
    let schema = site.schema();
    let entries = assemble(&site, &schema);
    let backend = RecordingBackend::writing_to(site.root());
    let translator = ScriptedTranslator::new();
    let credentials = ScriptedCredentials::answering("typed-key");

    let mut session = DraftSession::new();
    session.load(Draft::for_entry(&schema, find(&entries, "hello")).unwrap());

    let notifications = session
        .copy_from_locale(
            "en",
            "fr",
            CopyOptions::new().translate(Translation::new(&translator, &credentials)),
        )
        .await
        .unwrap();
    let kinds: Vec<_> = notifications.iter().map(|n| n.kind).collect();
    assert_eq!(
        kinds,
        vec![
            NotificationKind::TranslationStarted,
            NotificationKind::TranslationComplete
        ]
    );
    assert_eq!(notifications[1].count, 3);
    assert_eq!(*credentials.prompts.lock().unwrap(), vec![true]);

    let draft = session.close().unwrap();
    let saving = saving_entry_data(&schema, &draft).unwrap();
    backend
        .commit_changes(&saving.changes, CommitType::UpdateEntry)
        .await
        .unwrap();

    let french = site.read("content/posts/hello.fr.md");
    assert!(french.contains("Bonjour"));
    assert!(french.contains("fr:Short"));
    assert!(french.contains("fr:Hello world"));

    let reloaded = assemble(&site, &schema);
    let post = find(&reloaded, "hello");
    assert_eq!(post.locales["fr"].content[&key("summary")], json!("fr:Short"));
    assert_eq!(post.locales["en"].content[&key("summary")], json!("Short"));
}

#[tokio::test]
async fn test_failed_translation_leaves_draft_unchanged() {
    let site = setup_site();
    let schema = site.schema();
    let entries = assemble(&site, &schema);
    let translator = ScriptedTranslator::failing("service unavailable");
    let credentials = ScriptedCredentials::saved("saved-key");

    let mut draft = Draft::for_entry(&schema, find(&entries, "hello")).unwrap();
    let before = draft.clone();
    let notifications = draft
        .copy_from_locale(
            "en",
            "fr",
            CopyOptions::new().translate(Translation::new(&translator, &credentials)),
        )
        .await
        .unwrap();

    assert_eq!(notifications.len(), 2);
    assert_eq!(notifications[1].kind, NotificationKind::TranslationError);
    assert_eq!(draft, before);
    assert_eq!(translator.request_count(), 1);
    assert!(credentials.prompts.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_cancelled_prompt_skips_translation() {
    let site = setup_site();
    let schema = site.schema();
    let entries = assemble(&site, &schema);
    let translator = ScriptedTranslator::new();
    let credentials = ScriptedCredentials::cancelling();
    let title = key("title");

    let mut draft = Draft::for_entry(&schema, find(&entries, "hello")).unwrap();
    let notifications = draft
        .copy_from_locale(
            "en",
            "fr",
            CopyOptions::new()
                .key_path(&title)
                .translate(Translation::new(&translator, &credentials)),
        )
        .await
        .unwrap();

    assert!(notifications.is_empty());
    assert_eq!(translator.request_count(), 0);
    assert_eq!(*credentials.prompts.lock().unwrap(), vec![false]);
    assert_eq!(
        draft.values("fr").unwrap()[&title],
        json!("Bonjour")
    );
}

#[tokio::test]
async fn test_create_edit_and_drop_locale() {
    let site = setup_site();
    let schema = site.schema();
    let backend = RecordingBackend::writing_to(site.root());

    let target = schema.target("posts", None).unwrap();
    let mut dynamic = DynamicValues::new();
    dynamic.insert(key("tags"), "release, notes".to_string());
    let mut draft = Draft::for_new_entry(target, &dynamic);
    draft.set_slug("en", "launch");
    draft
        .set_value("en", &key("title"), json!("Launch"), CrossLocaleSync::Enabled)
        .unwrap();
    draft
        .set_value("fr", &key("title"), json!("Lancement"), CrossLocaleSync::Enabled)
        .unwrap();

    let saving = saving_entry_data(&schema, &draft).unwrap();
    let created: Vec<_> = saving
        .changes
        .iter()
        .map(|c| (c.action, c.path.as_str()))
        .collect();
    assert_eq!(
        created,
        vec![
            (ChangeAction::Create, "content/posts/launch.en.md"),
            (ChangeAction::Create, "content/posts/launch.fr.md"),
        ]
    );
    backend
        .commit_changes(&saving.changes, CommitType::CreateEntry)
        .await
        .unwrap();

    let entries = assemble(&site, &schema);
    let launch = find(&entries, "launch");
    assert_eq!(launch.locales["fr"].content[&key("tags.1")], json!("notes"));

    let mut draft = Draft::for_entry(&schema, launch).unwrap();
    draft.toggle_locale("fr").unwrap();
    let saving = saving_entry_data(&schema, &draft).unwrap();
    backend
        .commit_changes(&saving.changes, CommitType::UpdateEntry)
        .await
        .unwrap();

    assert!(!site.root().join("content/posts/launch.fr.md").exists());
    let entries = assemble(&site, &schema);
    assert_eq!(
        find(&entries, "launch").locales.keys().collect::<Vec<_>>(),
        vec!["en"]
    );
}

#[tokio::test]
async fn test_edit_menu_list() {
    let site = setup_site();
    let schema = site.schema();
    let entries = assemble(&site, &schema);
    let backend = RecordingBackend::writing_to(site.root());

    let mut draft = Draft::for_entry(&schema, find(&entries, "menu")).unwrap();
    draft
        .update_list_field("en", &key("items"), |items, states| {
            items.push(Some(json!("Blog")));
            states.push(None);
        })
        .unwrap();
    let saving = saving_entry_data(&schema, &draft).unwrap();
    backend
        .commit_changes(&saving.changes, CommitType::UpdateEntry)
        .await
        .unwrap();

    let entries = assemble(&site, &schema);
    let menu = find(&entries, "menu");
    assert_eq!(menu.locales["en"].content[&key("items.1")], json!("Blog"));
    assert_eq!(menu.locales["fr"].content.get(&key("items.1")), None);
}

#[tokio::test]
async fn test_move_asset_rewrites_entries() {
    let site = setup_site();
    let schema = site.schema();
    let entries = assemble(&site, &schema);
    let backend = RecordingBackend::writing_to(site.root());

    let folder = schema.global_asset_folder().unwrap().clone();
    let asset = Asset {
        path: "static/images/logo.png".to_string(),
        name: "logo.png".to_string(),
        sha: "sha-logo".to_string(),
        size: 3,
        folder,
        data: None,
    };
    let ctx = AssetMoveContext {
        schema: &schema,
        entries: &entries,
    };
    let moving = vec![MovingAsset {
        asset,
        path: "static/images/brand/logo.png".to_string(),
    }];

    let report = move_assets(&ctx, MoveAction::Move, &moving, &backend)
        .await
        .unwrap();

    assert!(report.moved());
    assert_eq!(backend.commit_count(), 1);
    assert_eq!(report.saving_entries.len(), 2);
    assert!(site.root().join("static/images/brand/logo.png").exists());
    assert!(!site.root().join("static/images/logo.png").exists());

    let about = site.read("content/pages/about.md");
    assert!(about.contains("image: /images/brand/logo.png"));
    assert!(about.contains("![logo](/images/brand/logo.png)"));

    let reloaded = assemble(&site, &schema);
    let post = find(&reloaded, "hello");
    assert_eq!(
        post.locales["en"].content[&key("cover")],
        json!("/images/brand/logo.png")
    );
}
