use core::time::Duration;
use std::fs;

use anyhow::{Error, anyhow};
use companion::downloads::{self, IMAGE_FILE_NAME, image_file_name};
use companion::summary::{css_text, export_json, tailwind_classes};
use companion::{DownloadError, ElementSummary};
use css_color::{ContrastTier, check_contrast};
use inspector::{AssetBundle, ElementRecord, StyleSnapshot};
use url::Url;

fn cta_record() -> ElementRecord {
    ElementRecord {
        tag_name: "button".to_owned(),
        inner_text: String::new(),
        styles: StyleSnapshot {
            color: "rgb(255, 255, 255)".to_owned(),
            background_color: "rgb(0, 0, 0)".to_owned(),
            font_family: "\"Inter\", sans-serif".to_owned(),
            font_size: "14px".to_owned(),
            padding: "10px 20px".to_owned(),
            margin: "0px".to_owned(),
            border_radius: "8px".to_owned(),
            ..StyleSnapshot::default()
        },
        assets: AssetBundle {
            palette: ["#6366f1", "rgb(0, 0, 0)", "#6366f1"].map(str::to_owned).to_vec(),
            ..AssetBundle::default()
        },
        timestamp: 1_700_000_000_000,
    }
}

#[test]
fn white_on_black_is_aaa() {
    let tier = check_contrast("rgb(255,255,255)", "rgb(0,0,0)");
    assert!(matches!(tier, ContrastTier::Aaa(ratio) if (ratio - 21.0).abs() < 0.01));
    assert_eq!(tier.to_string(), "AAA (21.0)");
}

#[test]
fn summary_mirrors_record_for_display() {
    let summary = ElementSummary::from_record(&cta_record());
    assert_eq!(summary.inner_text, "No text content");
    assert_eq!(summary.font_family, "Inter, sans-serif");
    assert_eq!(summary.contrast.to_string(), "AAA (21.0)");
    assert!(!summary.contrast_fails());
    assert_eq!(summary.palette, ["#6366f1", "rgb(0, 0, 0)"]);
}

#[test]
fn tailwind_export_follows_heuristic() {
    let record = cta_record();
    assert_eq!(
        tailwind_classes(&record.styles),
        "text-[rgb(255, 255, 255)] bg-[rgb(0, 0, 0)] text-sm p-[10px 20px] rounded-[8px]"
    );

    let large = StyleSnapshot {
        color: "rgba(0, 0, 0, 0)".to_owned(),
        background_color: "transparent".to_owned(),
        font_size: "32px".to_owned(),
        padding: "0px".to_owned(),
        margin: "4px".to_owned(),
        border_radius: "0px".to_owned(),
        ..StyleSnapshot::default()
    };
    assert_eq!(tailwind_classes(&large), "text-[32px] m-[4px]");
}

#[test]
fn css_and_json_exports_carry_sampled_values() -> Result<(), Error> {
    let record = cta_record();
    let css = css_text(&record.styles);
    assert!(css.starts_with("color: rgb(255, 255, 255);\nbackground-color: rgb(0, 0, 0);"));
    assert!(css.contains("padding: 10px 20px;"));
    assert!(!css.contains("width:"));

    let json: serde_json::Value = serde_json::from_str(&export_json(&record)?)?;
    assert_eq!(json["tagName"], "button");
    assert_eq!(json["styles"]["padding"], "10px 20px");
    Ok(())
}

#[tokio::test]
async fn assets_are_saved_under_their_download_names() -> Result<(), Error> {
    let _ = env_logger::builder().is_test(true).try_init();
    let dir = tempfile::tempdir()?;
    let out = dir.path().join("assets");

    let svg = downloads::save_svg(&out, 0, "<svg></svg>")?;
    assert_eq!(svg, out.join("icon-0.svg"));
    assert_eq!(fs::read_to_string(&svg)?, "<svg></svg>");

    let lottie = downloads::save_lottie(&out, 2, "{\"v\":\"5.7\"}")?;
    assert_eq!(lottie, out.join("animation-2.json"));

    let source = dir.path().join("hero.bin");
    fs::write(&source, [0x89_u8, b'P', b'N', b'G'])?;
    let src = Url::from_file_path(&source).map_err(|()| anyhow!("bad path"))?;
    let image = downloads::save_image(&out, 0, src.as_str(), Duration::from_secs(5)).await?;
    assert_eq!(image, out.join(IMAGE_FILE_NAME));
    assert_eq!(fs::read(&image)?, [0x89_u8, b'P', b'N', b'G']);
    assert_eq!(image_file_name(3), "image-3.png");

    let bad = downloads::save_image(&out, 1, "not a url", Duration::from_secs(5)).await;
    assert!(matches!(bad, Err(DownloadError::BadUrl(_))));
    Ok(())
}
