use api_client::{GenerationEvent, ImageListing, SearchHit};
use iced::Application;
use ui::{Message, PicSeekUI, SearchInput, SearchMode, Tab};

fn new_ui() -> PicSeekUI {
    let (ui, _) = PicSeekUI::new(("http://127.0.0.1:9".to_string(), 0, 2));
    ui
}

fn listing(images: &[&str], originals: &[&str]) -> ImageListing {
    ImageListing {
        images: images.iter().map(|s| s.to_string()).collect(),
        original_images: originals.iter().map(|s| s.to_string()).collect(),
    }
}

fn hit(filename: &str, similarity: f32) -> SearchHit {
    SearchHit {
        filename: filename.to_string(),
        image_url: format!("/images/{}", filename),
        similarity,
    }
}

#[test]
fn test_initial_state() {
    let ui = new_ui();
    assert_eq!(ui.active_tab(), Tab::Gallery);
    assert_eq!(ui.tile_count(), 0);
    assert_eq!(ui.search_mode(), SearchMode::Upload);
    assert!(ui.pending_input().is_none());
    assert!(!ui.search_enabled());
    assert!(!ui.generating());
    assert!(!ui.modal_open());
}

#[test]
fn test_gallery_loaded_renders_all_tiles_and_flags_originals() {
    let mut ui = new_ui();
    let _ = ui.update(Message::GalleryLoaded(Ok(listing(
        &["new.jpg", "cat.jpg", "dog.jpg"],
        &["cat.jpg", "dog.jpg"],
    ))));

    assert_eq!(ui.tile_count(), 3);
    let originals: Vec<&str> = ui
        .tiles()
        .iter()
        .filter(|t| t.is_original)
        .map(|t| t.filename.as_str())
        .collect();
    assert_eq!(originals, vec!["cat.jpg", "dog.jpg"]);
    assert!(!ui.tiles()[0].is_original);
}

#[test]
fn test_gallery_load_failure_sets_banner() {
    let mut ui = new_ui();
    let _ = ui.update(Message::GalleryLoaded(Err("connection refused".into())));
    assert_eq!(ui.gallery_error(), Some("Error: connection refused"));
    assert_eq!(ui.tile_count(), 0);
}

#[test]
fn test_selection_ignores_original_images() {
    let mut ui = new_ui();
    let _ = ui.update(Message::GalleryLoaded(Ok(listing(
        &["new.jpg", "cat.jpg"],
        &["cat.jpg"],
    ))));

    let _ = ui.update(Message::TileToggled("new.jpg".into(), true));
    let _ = ui.update(Message::TileToggled("cat.jpg".into(), true));
    assert_eq!(ui.selected_count(), 1);
    assert!(ui.is_selected("new.jpg"));
    assert!(!ui.is_selected("cat.jpg"));

    let _ = ui.update(Message::TileToggled("new.jpg".into(), false));
    assert_eq!(ui.selected_count(), 0);
}

#[test]
fn test_gallery_reload_clears_selection() {
    let mut ui = new_ui();
    let _ = ui.update(Message::GalleryLoaded(Ok(listing(&["a.jpg"], &[]))));
    let _ = ui.update(Message::TileToggled("a.jpg".into(), true));
    assert_eq!(ui.selected_count(), 1);

    let _ = ui.update(Message::LoadGallery);
    assert_eq!(ui.selected_count(), 0);
}

#[test]
fn test_batch_delete_reports_partial_failure_and_reloads_once() {
    let mut ui = new_ui();
    let _ = ui.update(Message::GalleryLoaded(Ok(listing(
        &["a.jpg", "b.jpg", "c.jpg"],
        &[],
    ))));
    for name in ["a.jpg", "b.jpg", "c.jpg"] {
        let _ = ui.update(Message::TileToggled(name.into(), true));
    }

    let _ = ui.update(Message::RequestDeleteSelected);
    assert!(ui.confirm_open());
    let _ = ui.update(Message::ConfirmPending);
    assert!(ui.batch_active());
    assert_eq!(ui.toast_text(), Some("Deleting 1 of 3..."));

    let loads_before = ui.gallery_loads();
    let _ = ui.update(Message::ImageDeleted("a.jpg".into(), Ok(())));
    assert_eq!(ui.toast_text(), Some("Deleting 2 of 3..."));
    let _ = ui.update(Message::ImageDeleted("b.jpg".into(), Err("HTTP 500".into())));
    let _ = ui.update(Message::ImageDeleted("c.jpg".into(), Ok(())));

    assert!(!ui.batch_active());
    assert_eq!(ui.toast_text(), Some("Deleted 2 images, 1 failed"));
    assert_eq!(ui.gallery_loads(), loads_before + 1);
    assert_eq!(ui.selected_count(), 0);
}

#[test]
fn test_batch_delete_all_failures_skips_reload() {
    let mut ui = new_ui();
    let _ = ui.update(Message::GalleryLoaded(Ok(listing(&["a.jpg", "b.jpg"], &[]))));
    for name in ["a.jpg", "b.jpg"] {
        let _ = ui.update(Message::TileToggled(name.into(), true));
    }
    let _ = ui.update(Message::RequestDeleteSelected);
    let _ = ui.update(Message::ConfirmPending);

    let loads_before = ui.gallery_loads();
    let _ = ui.update(Message::ImageDeleted("a.jpg".into(), Err("HTTP 403".into())));
    let _ = ui.update(Message::ImageDeleted("b.jpg".into(), Err("HTTP 403".into())));

    assert!(!ui.batch_active());
    assert_eq!(ui.toast_text(), Some("Deleted 0 images, 2 failed"));
    assert_eq!(ui.gallery_loads(), loads_before);
}

#[test]
fn test_batch_delete_success_toast() {
    let mut ui = new_ui();
    let _ = ui.update(Message::GalleryLoaded(Ok(listing(&["a.jpg"], &[]))));
    let _ = ui.update(Message::TileToggled("a.jpg".into(), true));
    let _ = ui.update(Message::RequestDeleteSelected);
    let _ = ui.update(Message::ConfirmPending);
    let _ = ui.update(Message::ImageDeleted("a.jpg".into(), Ok(())));
    assert_eq!(ui.toast_text(), Some("Successfully deleted 1 image"));
}

#[test]
fn test_delete_all_with_only_originals_short_circuits() {
    let mut ui = new_ui();
    let _ = ui.update(Message::GalleryLoaded(Ok(listing(
        &["cat.jpg", "dog.jpg"],
        &["cat.jpg", "dog.jpg"],
    ))));

    let _ = ui.update(Message::RequestDeleteAll);
    assert!(!ui.confirm_open());
    assert_eq!(
        ui.gallery_error(),
        Some("No deletable images. Original images cannot be deleted.")
    );
}

#[test]
fn test_cancel_confirmation_leaves_gallery_untouched() {
    let mut ui = new_ui();
    let _ = ui.update(Message::GalleryLoaded(Ok(listing(&["a.jpg"], &[]))));
    let _ = ui.update(Message::RequestDeleteImage("a.jpg".into()));
    assert!(ui.confirm_open());
    let _ = ui.update(Message::CancelPending);
    assert!(!ui.confirm_open());
    assert!(!ui.batch_active());
    assert_eq!(ui.tile_count(), 1);
}

#[test]
fn test_upload_batch_counts_failures_and_reloads() {
    let mut ui = new_ui();
    let _ = ui.update(Message::UploadFilesChosen(vec![
        "one.jpg".into(),
        "two.jpg".into(),
    ]));
    assert!(ui.batch_active());
    assert_eq!(ui.toast_text(), Some("Uploading 1 of 2..."));

    let loads_before = ui.gallery_loads();
    let _ = ui.update(Message::ImageUploaded(
        "one.jpg".into(),
        Err("Invalid file type".into()),
    ));
    // A per-item failure surfaces in the banner and the loop continues.
    assert!(ui
        .gallery_error()
        .unwrap()
        .contains("Error uploading one.jpg"));
    assert!(ui.batch_active());
    let _ = ui.update(Message::ImageUploaded("two.jpg".into(), Ok(())));

    assert!(!ui.batch_active());
    assert_eq!(ui.toast_text(), Some("Uploaded 1 file, 1 failed"));
    assert_eq!(ui.gallery_loads(), loads_before + 1);
}

#[test]
fn test_search_mode_switch_resets_pending_input() {
    let mut ui = new_ui();
    let _ = ui.update(Message::FeaturesChecked(Ok(true)));
    let _ = ui.update(Message::SearchModeChanged(SearchMode::Library));
    let _ = ui.update(Message::LibraryImagePicked("cat.jpg".into()));
    assert!(matches!(
        ui.pending_input(),
        Some(SearchInput::Library(name)) if name == "cat.jpg"
    ));
    assert!(ui.search_enabled());

    let _ = ui.update(Message::SearchModeChanged(SearchMode::Upload));
    assert!(ui.pending_input().is_none());
    assert!(!ui.search_enabled());
}

#[test]
fn test_search_gated_on_feature_index() {
    let mut ui = new_ui();
    let _ = ui.update(Message::SearchModeChanged(SearchMode::Library));
    let _ = ui.update(Message::LibraryImagePicked("cat.jpg".into()));
    assert!(!ui.search_enabled());

    let _ = ui.update(Message::FeaturesChecked(Ok(true)));
    assert!(ui.search_enabled());

    let _ = ui.update(Message::FeaturesChecked(Ok(false)));
    assert!(!ui.search_enabled());
}

#[test]
fn test_tab_activation_issues_feature_check() {
    let mut ui = new_ui();
    assert_eq!(ui.feature_checks(), 0);
    let _ = ui.update(Message::TabSelected(Tab::Search));
    assert_eq!(ui.feature_checks(), 1);
    let _ = ui.update(Message::TabSelected(Tab::Gallery));
    let _ = ui.update(Message::TabSelected(Tab::Search));
    assert_eq!(ui.feature_checks(), 2);
}

#[test]
fn test_search_results_replace_previous() {
    let mut ui = new_ui();
    let _ = ui.update(Message::SearchFinished(Ok(vec![
        hit("cat.jpg", 0.91),
        hit("dog.jpg", 0.42),
    ])));
    assert_eq!(ui.results().len(), 2);

    let _ = ui.update(Message::SearchFinished(Ok(vec![hit("bird.jpg", 0.33)])));
    assert_eq!(ui.results().len(), 1);
    assert_eq!(ui.results()[0].filename, "bird.jpg");
}

#[test]
fn test_search_failure_sets_banner_and_reenables() {
    let mut ui = new_ui();
    let _ = ui.update(Message::FeaturesChecked(Ok(true)));
    let _ = ui.update(Message::SearchModeChanged(SearchMode::Library));
    let _ = ui.update(Message::LibraryImagePicked("cat.jpg".into()));
    let _ = ui.update(Message::PerformSearch);
    assert!(ui.searching());
    assert_eq!(ui.toast_text(), Some("Searching..."));
    assert!(!ui.search_enabled());

    let _ = ui.update(Message::SearchFinished(Err("Search failed".into())));
    assert!(!ui.searching());
    assert_eq!(ui.search_error(), Some("Error: Search failed"));
    assert!(ui.toast_text().is_none());
    assert!(ui.search_enabled());
}

#[test]
fn test_generation_stream_reenables_and_rechecks_once() {
    let mut ui = new_ui();
    let _ = ui.update(Message::GenerateFeatures);
    assert!(ui.generating());
    assert_eq!(ui.feature_checks(), 0);

    let _ = ui.update(Message::GenerationProgress(GenerationEvent::Progress {
        current: 1,
        total: 3,
    }));
    assert_eq!(ui.toast_text(), Some("Processing 1 of 3 images..."));
    let _ = ui.update(Message::GenerationProgress(GenerationEvent::Progress {
        current: 2,
        total: 3,
    }));
    let _ = ui.update(Message::GenerationProgress(GenerationEvent::Complete {
        count: 3,
    }));
    assert_eq!(ui.toast_text(), Some("Generated features for 3 images"));
    assert_eq!(ui.feature_checks(), 1);

    let _ = ui.update(Message::GenerationFinished(Ok(3)));
    assert!(!ui.generating());
    assert_eq!(ui.feature_checks(), 1);
}

#[test]
fn test_generation_failure_reenables_and_surfaces_error() {
    let mut ui = new_ui();
    let _ = ui.update(Message::GenerateFeatures);
    let _ = ui.update(Message::GenerationFinished(Err("no images".into())));
    assert!(!ui.generating());
    assert_eq!(ui.gallery_error(), Some("Error: no images"));
    assert_eq!(ui.feature_checks(), 0);
}

#[test]
fn test_duplicate_generate_request_ignored() {
    let mut ui = new_ui();
    let _ = ui.update(Message::GenerateFeatures);
    let _ = ui.update(Message::GenerateFeatures);
    assert!(ui.generating());
    let _ = ui.update(Message::GenerationFinished(Ok(0)));
    assert!(!ui.generating());
}

#[test]
fn test_modal_closes_on_escape_backdrop_and_close_control() {
    let mut ui = new_ui();

    let open = Message::OpenModal {
        filename: "cat.jpg".into(),
        caption: "cat.jpg (87.3% match)".into(),
    };

    let _ = ui.update(open.clone());
    assert!(ui.modal_open());
    assert_eq!(ui.modal_caption(), Some("cat.jpg (87.3% match)"));
    let _ = ui.update(Message::EscapePressed);
    assert!(!ui.modal_open());

    let _ = ui.update(open.clone());
    let _ = ui.update(Message::BackdropPressed);
    assert!(!ui.modal_open());

    let _ = ui.update(open.clone());
    let _ = ui.update(Message::CloseModal);
    assert!(!ui.modal_open());

    let _ = ui.update(open);
    let _ = ui.update(Message::ModalImagePressed);
    assert!(ui.modal_open());
}

#[test]
fn test_escape_cancels_confirmation_before_modal() {
    let mut ui = new_ui();
    let _ = ui.update(Message::GalleryLoaded(Ok(listing(&["a.jpg"], &[]))));
    let _ = ui.update(Message::OpenModal {
        filename: "a.jpg".into(),
        caption: "a.jpg".into(),
    });
    let _ = ui.update(Message::RequestDeleteImage("a.jpg".into()));

    let _ = ui.update(Message::EscapePressed);
    assert!(!ui.confirm_open());
    assert!(ui.modal_open());

    let _ = ui.update(Message::EscapePressed);
    assert!(!ui.modal_open());
}

#[test]
fn test_stale_toast_timer_does_not_clear_newer_toast() {
    let mut ui = new_ui();
    let _ = ui.update(Message::GalleryLoaded(Ok(listing(&["a.jpg"], &[]))));
    let _ = ui.update(Message::TileToggled("a.jpg".into(), true));
    let _ = ui.update(Message::RequestDeleteSelected);
    let _ = ui.update(Message::ConfirmPending);

    // A timer scheduled for the progress toast must not clear the summary.
    let _ = ui.update(Message::ToastExpired(0));
    assert!(ui.toast_text().is_some());

    let _ = ui.update(Message::ImageDeleted("a.jpg".into(), Ok(())));
    assert_eq!(ui.toast_text(), Some("Successfully deleted 1 image"));
}

#[test]
fn test_clear_search_input_disables_search() {
    let mut ui = new_ui();
    let _ = ui.update(Message::FeaturesChecked(Ok(true)));
    let _ = ui.update(Message::SearchModeChanged(SearchMode::Library));
    let _ = ui.update(Message::LibraryImagePicked("cat.jpg".into()));
    assert!(ui.search_enabled());

    let _ = ui.update(Message::ClearSearchInput);
    assert!(ui.pending_input().is_none());
    assert!(!ui.search_enabled());
}

#[test]
fn test_library_options_populated_on_search_tab() {
    let mut ui = new_ui();
    let _ = ui.update(Message::LibraryOptionsLoaded(Ok(vec![
        "cat.jpg".into(),
        "dog.jpg".into(),
    ])));
    // Selecting from the populated list sets the pending input.
    let _ = ui.update(Message::LibraryImagePicked("dog.jpg".into()));
    assert!(matches!(
        ui.pending_input(),
        Some(SearchInput::Library(name)) if name == "dog.jpg"
    ));
}
