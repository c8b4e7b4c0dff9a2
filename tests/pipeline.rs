use std::time::Duration;

use chrono::NaiveDate;
use the2px_studio::{
    BackgroundFill, CatalogEntry, CatalogSource, CatalogTransport, ColorToken, EditorSession,
    ExportFormat, FixedSize, ManualClock, PickerTarget, Preview, RawPage, RecolorEngine,
    SizingPolicy, StudioConfig, StudioError, StudioResult, extract_colors, render_canvas,
};

const STAR: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="200" height="100" viewBox="0 0 200 100">
  <rect width="200" height="100" fill="#FFCC00"/>
  <path d="M100 10 L120 90 L80 90 Z" fill="#333" stroke="#ffcc00"/>
</svg>"##;

const LEAF: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="100" height="200"><rect width="100" height="200" fill="#2e7d32"/></svg>"##;

fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

fn tok(s: &str) -> ColorToken {
    ColorToken::parse(s).unwrap()
}

struct FakeCatalog;

impl CatalogTransport for FakeCatalog {
    fn fetch_page(&mut self, page: u32, _per_page: u32) -> StudioResult<RawPage> {
        let body = match page {
            1 => r#"[{"id": 1, "title": {"rendered": "Star"}, "svg_image_file": "star.svg", "svg_image_tags": "sky"}]"#,
            2 => r#"[{"id": 2, "title": {"rendered": "Leaf"}, "svg_image_file": "leaf.svg", "svg_image_tags": "plant, green"}]"#,
            _ => return Err(StudioError::fetch(page, "no such page")),
        };
        Ok(RawPage {
            body: body.to_owned(),
            total_pages: 2,
        })
    }

    fn fetch_document(&mut self, url: &str) -> StudioResult<String> {
        match url.rsplit('/').next() {
            Some("star.svg") => Ok(STAR.to_owned()),
            Some("leaf.svg") => Ok(LEAF.to_owned()),
            _ => Err(StudioError::fetch(0, format!("404 {url}"))),
        }
    }
}

fn march_fifth() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 5).unwrap()
}

#[test]
fn browse_recolor_and_export() {
    init_logging();
    let config = StudioConfig::default();
    let mut source = CatalogSource::new(
        FakeCatalog,
        config.catalog.base_url.clone(),
        config.catalog.per_page,
    );
    let entries: Vec<CatalogEntry> = source.fetch_all_entries().unwrap();
    assert_eq!(entries.len(), 2);

    let clock = ManualClock::new();
    let mut session = EditorSession::with_clock(config, clock.clone());
    session.set_catalog(entries.clone());

    let star = entries[0].clone();
    let markup = source.fetch_markup(&star).unwrap();
    session.open_entry(star, markup);
    assert_eq!(
        session.palette().slots(),
        &[tok("#ffcc00"), tok("#333")]
    );

    // Drag through a few shades faster than the throttle interval.
    session.open_picker(PickerTarget::Slot(0)).unwrap();
    assert_eq!(session.pick_color(tok("#ff0000")).unwrap(), Some(Preview::Applied));
    for shade in ["#ee0000", "#dd0000", "#0000ff"] {
        clock.advance_ms(10);
        let preview = session.pick_color(tok(shade)).unwrap();
        assert!(matches!(preview, Some(Preview::Scheduled(_))));
    }
    clock.advance(Duration::from_millis(20));
    assert!(session.poll());
    session.close_picker();

    let committed = session.engine().committed().as_str().to_owned();
    assert_eq!(extract_colors(&committed), vec![tok("#0000ff"), tok("#333")]);

    let artifact = session
        .export(
            ExportFormat::Jpeg,
            SizingPolicy::Fixed(FixedSize::Px500),
            march_fifth(),
        )
        .unwrap();
    assert_eq!(artifact.file_name, "the2px-Star-20240305.jpeg");

    let canvas = render_canvas(
        &committed,
        SizingPolicy::Fixed(FixedSize::Px500),
        session.engine().background(),
        the2px_studio::RasterFormat::Jpeg,
    )
    .unwrap();
    // 2:1 document at 500x500: 125px default-background margins.
    assert_eq!(canvas.get_pixel(250, 50).0, [0xfd, 0xfd, 0xfd, 255]);
    assert_eq!(canvas.get_pixel(5, 200).0, [0, 0, 255, 255]);

    // Move on to the next image through the carousel.
    assert_eq!(session.carousel().len(), 1);
    let opened = session
        .select_from_carousel(0, |entry| source.fetch_markup(entry))
        .unwrap();
    assert!(opened);
    assert_eq!(session.title(), "Leaf");
    assert_eq!(session.tags(), ["plant".to_string(), "green".to_string()]);
    assert_eq!(session.palette().len(), 1);
    assert!(!session.engine().has_uncommitted_changes());
}

#[test]
fn png_export_of_tall_image_keeps_side_margins_clear() {
    init_logging();
    let mut engine = RecolorEngine::with_clock(ManualClock::new(), Duration::from_millis(50));
    engine.load(LEAF);
    engine.set_background(BackgroundFill::new(tok("#000")));

    let canvas = render_canvas(
        engine.committed().as_str(),
        SizingPolicy::Fixed(FixedSize::Px1000),
        engine.background(),
        the2px_studio::RasterFormat::Png,
    )
    .unwrap();

    assert_eq!((canvas.width(), canvas.height()), (1000, 1000));
    assert_eq!(canvas.get_pixel(100, 500)[3], 0);
    assert_eq!(canvas.get_pixel(900, 500)[3], 0);
    assert_eq!(canvas.get_pixel(500, 500).0, [0x2e, 0x7d, 0x32, 255]);
}
