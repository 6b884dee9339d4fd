//! User interface module for PicSeek.
//!
//! `PicSeekUI` is the client controller: it owns every piece of shared UI
//! state (gallery tiles and selection, search mode and pending input, batch
//! progress, toast, modal) and mutates it only inside `update`, in direct
//! response to user events or completed network futures.

mod gallery;
mod image_loader;
mod modal;
mod search;
mod style;
mod toast;

pub use gallery::{GalleryTile, TileWindow};
pub use image_loader::{ImageLoader, ImageLoaderError};
pub use search::{format_similarity, percentage, SearchInput, SearchMode};
pub use toast::Toast;

use api_client::{ApiClient, GenerationEvent, ImageListing, SearchHit};
use iced::widget::image::Handle;
use iced::widget::{
    button, checkbox, column, container, image, mouse_area, pick_list, progress_bar, row,
    scrollable, text,
};
use iced::{event, executor, keyboard, window, Application, Command, Element, Length, Settings,
    Subscription, Theme};
use modal::ModalView;
use rfd::AsyncFileDialog;
use std::collections::{HashMap, HashSet, VecDeque};
use std::path::PathBuf;
use std::sync::Arc;
use style::{MaterialSymbol, Palette};
use tokio::sync::{mpsc, Mutex};
use tokio::time::{sleep, Duration};

const TOAST_DISMISS: Duration = Duration::from_secs(3);
const IMAGE_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "gif", "bmp"];

pub fn run(server_url: String, preload: usize, concurrency: usize) -> iced::Result {
    PicSeekUI::run(Settings::with_flags((server_url, preload, concurrency)))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Gallery,
    Search,
}

impl std::fmt::Display for Tab {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Tab::Gallery => "Gallery",
            Tab::Search => "Search",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone)]
pub enum Message {
    TabSelected(Tab),
    LoadGallery,
    GalleryLoaded(Result<ImageListing, String>),
    GalleryScrolled(f32, f32), // offset, viewport height
    GalleryScrollSettled(u64),
    ThumbnailLoaded(String, Result<Handle, String>),
    TileToggled(String, bool),
    RequestDeleteImage(String),
    RequestDeleteSelected,
    RequestDeleteAll,
    ConfirmPending,
    CancelPending,
    ImageDeleted(String, Result<(), String>),
    PickUploadFiles,
    UploadFilesChosen(Vec<PathBuf>),
    FileDropped(PathBuf),
    ImageUploaded(String, Result<(), String>),
    SearchModeChanged(SearchMode),
    PickSearchFile,
    SearchFileChosen(Option<PathBuf>),
    SearchPreviewLoaded(Result<Handle, String>),
    LibraryImagePicked(String),
    LibraryOptionsLoaded(Result<Vec<String>, String>),
    ClearSearchInput,
    PerformSearch,
    SearchFinished(Result<Vec<SearchHit>, String>),
    ResultsScrolled(f32, f32),
    ResultsScrollSettled(u64),
    ResultImageLoaded(String, Result<Handle, String>),
    CheckFeatures,
    FeaturesChecked(Result<bool, String>),
    GenerateFeatures,
    GenerationProgress(GenerationEvent),
    GenerationStreamClosed,
    GenerationFinished(Result<u64, String>),
    OpenModal { filename: String, caption: String },
    ModalImageLoaded(Result<Handle, String>),
    CloseModal,
    BackdropPressed,
    ModalImagePressed,
    EscapePressed,
    ToastExpired(u64),
}

/// Pending destructive action awaiting its blocking confirmation dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
enum ConfirmAction {
    DeleteOne(String),
    DeleteSelected,
    DeleteAll,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BatchKind {
    Delete,
    Upload,
}

#[derive(Debug, Clone)]
enum BatchItem {
    Delete(String),
    Upload(PathBuf),
}

/// A sequential batch operation: one request in flight at a time, per-item
/// failures counted but never aborting the remainder.
#[derive(Debug)]
struct Batch {
    kind: BatchKind,
    queue: VecDeque<BatchItem>,
    done: usize,
    failed: usize,
    total: usize,
}

pub struct PicSeekUI {
    client: Arc<ApiClient>,
    image_loader: Arc<ImageLoader>,
    active_tab: Tab,

    tiles: Vec<GalleryTile>,
    selected: HashSet<String>,
    thumbnails: HashMap<String, Handle>,
    thumbnails_requested: HashSet<String>,
    tile_window: TileWindow,
    gallery_offset: f32,
    gallery_height: f32,
    gallery_scroll_epoch: u64,
    gallery_loading: bool,
    gallery_error: Option<String>,
    gallery_loads: u64,
    confirm: Option<ConfirmAction>,
    batch: Option<Batch>,

    search_mode: SearchMode,
    pending_input: Option<SearchInput>,
    preview: Option<Handle>,
    library_options: Vec<String>,
    features_exist: bool,
    feature_checks: u64,
    searching: bool,
    search_error: Option<String>,
    results: Vec<SearchHit>,
    result_images: HashMap<String, Handle>,
    result_images_requested: HashSet<String>,
    results_window: TileWindow,
    results_offset: f32,
    results_height: f32,
    results_scroll_epoch: u64,

    generating: bool,
    generation_rx: Option<Arc<Mutex<mpsc::UnboundedReceiver<GenerationEvent>>>>,

    toast: Option<Toast>,
    toast_epoch: u64,
    modal: Option<ModalView>,
    modal_image: Option<Handle>,

    preload_count: usize,
}

impl PicSeekUI {
    /// Expose current state for testing purposes
    pub fn active_tab(&self) -> Tab {
        self.active_tab
    }

    pub fn tiles(&self) -> &[GalleryTile] {
        &self.tiles
    }

    pub fn tile_count(&self) -> usize {
        self.tiles.len()
    }

    pub fn selected_count(&self) -> usize {
        self.selected.len()
    }

    pub fn is_selected(&self, filename: &str) -> bool {
        self.selected.contains(filename)
    }

    pub fn gallery_loads(&self) -> u64 {
        self.gallery_loads
    }

    pub fn gallery_loading(&self) -> bool {
        self.gallery_loading
    }

    pub fn gallery_error(&self) -> Option<&str> {
        self.gallery_error.as_deref()
    }

    pub fn batch_active(&self) -> bool {
        self.batch.is_some()
    }

    pub fn confirm_open(&self) -> bool {
        self.confirm.is_some()
    }

    pub fn toast_text(&self) -> Option<&str> {
        self.toast.as_ref().map(|t| t.message.as_str())
    }

    pub fn search_mode(&self) -> SearchMode {
        self.search_mode
    }

    pub fn pending_input(&self) -> Option<&SearchInput> {
        self.pending_input.as_ref()
    }

    pub fn search_enabled(&self) -> bool {
        self.features_exist && self.pending_input.is_some() && !self.searching
    }

    pub fn features_exist(&self) -> bool {
        self.features_exist
    }

    pub fn feature_checks(&self) -> u64 {
        self.feature_checks
    }

    pub fn searching(&self) -> bool {
        self.searching
    }

    pub fn search_error(&self) -> Option<&str> {
        self.search_error.as_deref()
    }

    pub fn results(&self) -> &[SearchHit] {
        &self.results
    }

    pub fn generating(&self) -> bool {
        self.generating
    }

    pub fn modal_open(&self) -> bool {
        self.modal.is_some()
    }

    pub fn modal_caption(&self) -> Option<&str> {
        self.modal.as_ref().map(|m| m.caption.as_str())
    }

    fn deletable(&self) -> Vec<String> {
        self.tiles
            .iter()
            .filter(|t| !t.is_original)
            .map(|t| t.filename.clone())
            .collect()
    }

    fn set_toast(&mut self, toast: Toast, dismiss_after: Option<Duration>) -> Command<Message> {
        self.toast = Some(toast);
        self.toast_epoch += 1;
        let epoch = self.toast_epoch;
        match dismiss_after {
            Some(delay) => Command::perform(
                async move {
                    sleep(delay).await;
                },
                move |_| Message::ToastExpired(epoch),
            ),
            None => Command::none(),
        }
    }

    fn clear_toast(&mut self) {
        self.toast = None;
        self.toast_epoch += 1;
    }

    /// Request thumbnails for every tile in `range` that has none yet.
    fn request_thumbnails(&mut self, range: std::ops::Range<usize>) -> Vec<Command<Message>> {
        let mut commands = Vec::new();
        for index in range {
            let tile = match self.tiles.get(index) {
                Some(tile) => tile,
                None => break,
            };
            if self.thumbnails.contains_key(&tile.filename)
                || !self.thumbnails_requested.insert(tile.filename.clone())
            {
                continue;
            }
            let filename = tile.filename.clone();
            let loader = self.image_loader.clone();
            let url = self.client.thumb_url(&filename);
            commands.push(Command::perform(
                async move { loader.load(&url).await.map_err(|e| e.to_string()) },
                move |result| Message::ThumbnailLoaded(filename, result),
            ));
        }
        commands
    }

    fn gallery_visibility_pass(&mut self) -> Command<Message> {
        self.tile_window =
            gallery::tile_window(self.tiles.len(), self.gallery_offset, self.gallery_height);
        let commands = self.request_thumbnails(self.tile_window.lazy.clone());
        Command::batch(commands)
    }

    fn results_visibility_pass(&mut self) -> Command<Message> {
        self.results_window =
            gallery::card_window(self.results.len(), self.results_offset, self.results_height);
        let mut commands = Vec::new();
        for index in self.results_window.lazy.clone() {
            let hit = match self.results.get(index) {
                Some(hit) => hit,
                None => break,
            };
            if self.result_images.contains_key(&hit.filename)
                || !self.result_images_requested.insert(hit.filename.clone())
            {
                continue;
            }
            let filename = hit.filename.clone();
            let loader = self.image_loader.clone();
            let url = self.client.absolute_url(&hit.image_url);
            commands.push(Command::perform(
                async move { loader.load(&url).await.map_err(|e| e.to_string()) },
                move |result| Message::ResultImageLoaded(filename, result),
            ));
        }
        Command::batch(commands)
    }

    fn start_batch(&mut self, kind: BatchKind, items: Vec<BatchItem>) -> Command<Message> {
        if self.batch.is_some() || items.is_empty() {
            return Command::none();
        }
        self.gallery_error = None;
        self.batch = Some(Batch {
            kind,
            total: items.len(),
            done: 0,
            failed: 0,
            queue: items.into(),
        });
        self.advance_batch()
    }

    fn advance_batch(&mut self) -> Command<Message> {
        let (item, step, total, kind) = match &mut self.batch {
            Some(batch) => match batch.queue.pop_front() {
                Some(item) => (item, batch.done + batch.failed + 1, batch.total, batch.kind),
                None => return self.finish_batch(),
            },
            None => return Command::none(),
        };

        let toast_cmd = match kind {
            BatchKind::Delete => self.set_toast(Toast::deleting(step, total), None),
            BatchKind::Upload => self.set_toast(Toast::uploading(step, total), None),
        };

        let client = self.client.clone();
        let work = match item {
            BatchItem::Delete(filename) => Command::perform(
                async move {
                    let result = client.delete_image(&filename).await.map_err(|e| e.to_string());
                    (filename, result)
                },
                |(filename, result)| Message::ImageDeleted(filename, result),
            ),
            BatchItem::Upload(path) => Command::perform(
                async move {
                    let filename = path
                        .file_name()
                        .and_then(|f| f.to_str())
                        .unwrap_or("upload")
                        .to_string();
                    let result = match tokio::fs::read(&path).await {
                        Ok(bytes) => client
                            .upload_image(&filename, bytes)
                            .await
                            .map_err(|e| e.to_string()),
                        Err(e) => Err(e.to_string()),
                    };
                    (filename, result)
                },
                |(filename, result)| Message::ImageUploaded(filename, result),
            ),
        };

        Command::batch(vec![toast_cmd, work])
    }

    fn finish_batch(&mut self) -> Command<Message> {
        let batch = match self.batch.take() {
            Some(batch) => batch,
            None => return Command::none(),
        };

        let summary = match batch.kind {
            BatchKind::Delete => {
                if batch.failed == 0 {
                    Toast::success(format!(
                        "Successfully deleted {} image{}",
                        batch.done,
                        plural(batch.done)
                    ))
                } else {
                    Toast::warning(format!(
                        "Deleted {} image{}, {} failed",
                        batch.done,
                        plural(batch.done),
                        batch.failed
                    ))
                }
            }
            BatchKind::Upload => {
                if batch.failed == 0 {
                    Toast::success(format!(
                        "Successfully uploaded {} file{}",
                        batch.done,
                        plural(batch.done)
                    ))
                } else {
                    Toast::warning(format!(
                        "Uploaded {} file{}, {} failed",
                        batch.done,
                        plural(batch.done),
                        batch.failed
                    ))
                }
            }
        };
        let dismiss = self.set_toast(summary, Some(TOAST_DISMISS));

        if batch.done == 0 {
            return dismiss;
        }
        if batch.kind == BatchKind::Delete {
            self.selected.clear();
        }
        Command::batch(vec![dismiss, self.update(Message::LoadGallery)])
    }

    fn set_search_file(&mut self, path: PathBuf) -> Command<Message> {
        self.pending_input = Some(SearchInput::File(path.clone()));
        self.preview = None;
        self.search_error = None;
        Command::perform(
            async move {
                tokio::fs::read(&path)
                    .await
                    .map(Handle::from_memory)
                    .map_err(|e| e.to_string())
            },
            Message::SearchPreviewLoaded,
        )
    }
}

fn plural(n: usize) -> &'static str {
    if n == 1 {
        ""
    } else {
        "s"
    }
}

impl Application for PicSeekUI {
    type Executor = executor::Default;
    type Message = Message;
    type Theme = Theme;
    type Flags = (String, usize, usize); // server url, thumbnail preload, fetch concurrency

    fn new(flags: Self::Flags) -> (Self, Command<Message>) {
        let (server_url, preload_count, concurrency) = flags;

        let app = Self {
            client: Arc::new(ApiClient::new(server_url)),
            image_loader: Arc::new(ImageLoader::new(concurrency)),
            active_tab: Tab::Gallery,
            tiles: Vec::new(),
            selected: HashSet::new(),
            thumbnails: HashMap::new(),
            thumbnails_requested: HashSet::new(),
            tile_window: TileWindow::default(),
            gallery_offset: 0.0,
            gallery_height: gallery::DEFAULT_VIEWPORT_HEIGHT,
            gallery_scroll_epoch: 0,
            gallery_loading: false,
            gallery_error: None,
            gallery_loads: 0,
            confirm: None,
            batch: None,
            search_mode: SearchMode::Upload,
            pending_input: None,
            preview: None,
            library_options: Vec::new(),
            features_exist: false,
            feature_checks: 0,
            searching: false,
            search_error: None,
            results: Vec::new(),
            result_images: HashMap::new(),
            result_images_requested: HashSet::new(),
            results_window: TileWindow::default(),
            results_offset: 0.0,
            results_height: gallery::DEFAULT_VIEWPORT_HEIGHT,
            results_scroll_epoch: 0,
            generating: false,
            generation_rx: None,
            toast: None,
            toast_epoch: 0,
            modal: None,
            modal_image: None,
            preload_count,
        };

        (
            app,
            Command::batch(vec![
                Command::perform(async {}, |_| Message::LoadGallery),
                Command::perform(async {}, |_| Message::CheckFeatures),
            ]),
        )
    }

    fn title(&self) -> String {
        String::from("PicSeek - Image Similarity Search")
    }

    fn update(&mut self, message: Message) -> Command<Message> {
        match message {
            Message::TabSelected(tab) => {
                self.active_tab = tab;
                match tab {
                    Tab::Gallery => return self.update(Message::LoadGallery),
                    Tab::Search => {
                        let client = self.client.clone();
                        let options = Command::perform(
                            async move {
                                client
                                    .list_images()
                                    .await
                                    .map(|listing| listing.images)
                                    .map_err(|e| e.to_string())
                            },
                            Message::LibraryOptionsLoaded,
                        );
                        return Command::batch(vec![
                            self.update(Message::CheckFeatures),
                            options,
                        ]);
                    }
                }
            }
            Message::LoadGallery => {
                self.gallery_loads += 1;
                self.gallery_loading = true;
                self.gallery_error = None;
                self.selected.clear();
                let client = self.client.clone();
                return Command::perform(
                    async move { client.list_images().await.map_err(|e| e.to_string()) },
                    Message::GalleryLoaded,
                );
            }
            Message::GalleryLoaded(result) => {
                self.gallery_loading = false;
                match result {
                    Ok(listing) => {
                        self.tiles = listing
                            .images
                            .iter()
                            .map(|filename| GalleryTile {
                                filename: filename.clone(),
                                is_original: listing.is_original(filename),
                            })
                            .collect();
                        self.thumbnails.clear();
                        self.thumbnails_requested.clear();
                        self.selected.clear();
                        self.gallery_offset = 0.0;
                        let window_pass = self.gallery_visibility_pass();
                        let preload =
                            self.request_thumbnails(0..self.preload_count.min(self.tiles.len()));
                        let mut commands = vec![window_pass];
                        commands.extend(preload);
                        return Command::batch(commands);
                    }
                    Err(error) => {
                        self.gallery_error = Some(format!("Error: {}", error));
                    }
                }
            }
            Message::GalleryScrolled(offset, height) => {
                self.gallery_offset = offset;
                self.gallery_height = height;
                self.gallery_scroll_epoch += 1;
                let epoch = self.gallery_scroll_epoch;
                return Command::perform(
                    async move {
                        sleep(Duration::from_millis(gallery::SCROLL_DEBOUNCE_MS)).await;
                    },
                    move |_| Message::GalleryScrollSettled(epoch),
                );
            }
            Message::GalleryScrollSettled(epoch) => {
                if epoch == self.gallery_scroll_epoch {
                    return self.gallery_visibility_pass();
                }
            }
            Message::ThumbnailLoaded(filename, result) => match result {
                Ok(handle) => {
                    self.thumbnails.insert(filename, handle);
                }
                Err(error) => {
                    tracing::warn!("failed to load thumbnail for {}: {}", filename, error);
                }
            },
            Message::TileToggled(filename, checked) => {
                let deletable = self
                    .tiles
                    .iter()
                    .any(|t| t.filename == filename && !t.is_original);
                if deletable {
                    if checked {
                        self.selected.insert(filename);
                    } else {
                        self.selected.remove(&filename);
                    }
                }
            }
            Message::RequestDeleteImage(filename) => {
                if self.batch.is_none() {
                    self.confirm = Some(ConfirmAction::DeleteOne(filename));
                }
            }
            Message::RequestDeleteSelected => {
                if self.batch.is_none() && !self.selected.is_empty() {
                    self.confirm = Some(ConfirmAction::DeleteSelected);
                }
            }
            Message::RequestDeleteAll => {
                if self.batch.is_some() {
                    return Command::none();
                }
                if self.deletable().is_empty() {
                    self.gallery_error = Some(
                        "No deletable images. Original images cannot be deleted.".to_string(),
                    );
                } else {
                    self.confirm = Some(ConfirmAction::DeleteAll);
                }
            }
            Message::ConfirmPending => {
                if let Some(action) = self.confirm.take() {
                    let items: Vec<BatchItem> = match action {
                        ConfirmAction::DeleteOne(filename) => vec![BatchItem::Delete(filename)],
                        ConfirmAction::DeleteSelected => self
                            .tiles
                            .iter()
                            .filter(|t| !t.is_original && self.selected.contains(&t.filename))
                            .map(|t| BatchItem::Delete(t.filename.clone()))
                            .collect(),
                        ConfirmAction::DeleteAll => self
                            .deletable()
                            .into_iter()
                            .map(BatchItem::Delete)
                            .collect(),
                    };
                    return self.start_batch(BatchKind::Delete, items);
                }
            }
            Message::CancelPending => {
                self.confirm = None;
            }
            Message::ImageDeleted(filename, result) => {
                if let Some(batch) = &mut self.batch {
                    match result {
                        Ok(()) => batch.done += 1,
                        Err(error) => {
                            batch.failed += 1;
                            self.gallery_error =
                                Some(format!("Error deleting {}: {}", filename, error));
                        }
                    }
                    return self.advance_batch();
                }
            }
            Message::PickUploadFiles => {
                if self.batch.is_some() {
                    return Command::none();
                }
                return Command::perform(
                    async {
                        AsyncFileDialog::new()
                            .add_filter("Images", &IMAGE_EXTENSIONS)
                            .pick_files()
                            .await
                            .map(|files| {
                                files.iter().map(|f| f.path().to_path_buf()).collect()
                            })
                            .unwrap_or_default()
                    },
                    Message::UploadFilesChosen,
                );
            }
            Message::UploadFilesChosen(paths) => {
                let items: Vec<BatchItem> = paths.into_iter().map(BatchItem::Upload).collect();
                return self.start_batch(BatchKind::Upload, items);
            }
            Message::FileDropped(path) => match self.active_tab {
                Tab::Gallery => {
                    if let Some(batch) = &mut self.batch {
                        // Files dropped mid-upload join the running batch;
                        // drops during a delete are ignored.
                        if batch.kind == BatchKind::Upload {
                            batch.queue.push_back(BatchItem::Upload(path));
                            batch.total += 1;
                        }
                        return Command::none();
                    }
                    return self.start_batch(BatchKind::Upload, vec![BatchItem::Upload(path)]);
                }
                Tab::Search => {
                    if self.search_mode == SearchMode::Upload && !self.searching {
                        return self.set_search_file(path);
                    }
                }
            },
            Message::ImageUploaded(filename, result) => {
                if let Some(batch) = &mut self.batch {
                    match result {
                        Ok(()) => batch.done += 1,
                        Err(error) => {
                            batch.failed += 1;
                            self.gallery_error =
                                Some(format!("Error uploading {}: {}", filename, error));
                        }
                    }
                    return self.advance_batch();
                }
            }
            Message::SearchModeChanged(mode) => {
                self.search_mode = mode;
                self.pending_input = None;
                self.preview = None;
            }
            Message::PickSearchFile => {
                if self.searching {
                    return Command::none();
                }
                return Command::perform(
                    async {
                        AsyncFileDialog::new()
                            .add_filter("Images", &IMAGE_EXTENSIONS)
                            .pick_file()
                            .await
                            .map(|f| f.path().to_path_buf())
                    },
                    Message::SearchFileChosen,
                );
            }
            Message::SearchFileChosen(path) => {
                if let Some(path) = path {
                    return self.set_search_file(path);
                }
            }
            Message::SearchPreviewLoaded(result) => match result {
                Ok(handle) => {
                    self.preview = Some(handle);
                }
                Err(error) => {
                    tracing::warn!("failed to load search preview: {}", error);
                }
            },
            Message::LibraryImagePicked(filename) => {
                self.pending_input = Some(SearchInput::Library(filename.clone()));
                self.preview = None;
                self.search_error = None;
                let loader = self.image_loader.clone();
                let url = self.client.thumb_url(&filename);
                return Command::perform(
                    async move { loader.load(&url).await.map_err(|e| e.to_string()) },
                    Message::SearchPreviewLoaded,
                );
            }
            Message::LibraryOptionsLoaded(result) => match result {
                Ok(images) => {
                    self.library_options = images;
                }
                Err(error) => {
                    tracing::warn!("failed to load library images: {}", error);
                }
            },
            Message::ClearSearchInput => {
                self.pending_input = None;
                self.preview = None;
            }
            Message::PerformSearch => {
                if !self.search_enabled() {
                    return Command::none();
                }
                let input = match self.pending_input.clone() {
                    Some(input) => input,
                    None => return Command::none(),
                };
                self.searching = true;
                self.search_error = None;
                let toast_cmd = self.set_toast(Toast::searching(), None);
                let client = self.client.clone();
                let search_cmd = Command::perform(
                    async move {
                        match input {
                            SearchInput::File(path) => {
                                let filename = path
                                    .file_name()
                                    .and_then(|f| f.to_str())
                                    .unwrap_or("query")
                                    .to_string();
                                let bytes =
                                    tokio::fs::read(&path).await.map_err(|e| e.to_string())?;
                                client
                                    .search(&filename, bytes)
                                    .await
                                    .map_err(|e| e.to_string())
                            }
                            SearchInput::Library(filename) => {
                                // The search endpoint accepts only uploaded
                                // binary content, so the library image is
                                // re-fetched and repackaged as an upload.
                                let bytes = client.fetch_image(&filename).await.map_err(|_| {
                                    "Failed to load image from library".to_string()
                                })?;
                                client
                                    .search(&filename, bytes)
                                    .await
                                    .map_err(|e| e.to_string())
                            }
                        }
                    },
                    Message::SearchFinished,
                );
                return Command::batch(vec![toast_cmd, search_cmd]);
            }
            Message::SearchFinished(result) => {
                self.searching = false;
                self.clear_toast();
                match result {
                    Ok(results) => {
                        self.results = results;
                        self.result_images.clear();
                        self.result_images_requested.clear();
                        self.results_offset = 0.0;
                        return self.results_visibility_pass();
                    }
                    Err(error) => {
                        self.search_error = Some(format!("Error: {}", error));
                    }
                }
            }
            Message::ResultsScrolled(offset, height) => {
                self.results_offset = offset;
                self.results_height = height;
                self.results_scroll_epoch += 1;
                let epoch = self.results_scroll_epoch;
                return Command::perform(
                    async move {
                        sleep(Duration::from_millis(gallery::SCROLL_DEBOUNCE_MS)).await;
                    },
                    move |_| Message::ResultsScrollSettled(epoch),
                );
            }
            Message::ResultsScrollSettled(epoch) => {
                if epoch == self.results_scroll_epoch {
                    return self.results_visibility_pass();
                }
            }
            Message::ResultImageLoaded(filename, result) => match result {
                Ok(handle) => {
                    self.result_images.insert(filename, handle);
                }
                Err(error) => {
                    tracing::warn!("failed to load result image for {}: {}", filename, error);
                }
            },
            Message::CheckFeatures => {
                self.feature_checks += 1;
                let client = self.client.clone();
                return Command::perform(
                    async move { client.check_features().await.map_err(|e| e.to_string()) },
                    Message::FeaturesChecked,
                );
            }
            Message::FeaturesChecked(result) => match result {
                Ok(exists) => {
                    self.features_exist = exists;
                }
                Err(error) => {
                    // Failed checks are logged only; search stays gated on
                    // the last known state.
                    tracing::warn!("feature check failed: {}", error);
                }
            },
            Message::GenerateFeatures => {
                if self.generating {
                    return Command::none();
                }
                self.generating = true;
                self.gallery_error = None;
                let (tx, rx) = mpsc::unbounded_channel();
                self.generation_rx = Some(Arc::new(Mutex::new(rx)));
                let client = self.client.clone();
                return Command::perform(
                    async move { client.generate_features(tx).await.map_err(|e| e.to_string()) },
                    Message::GenerationFinished,
                );
            }
            Message::GenerationProgress(event) => match event {
                GenerationEvent::Progress { current, total } => {
                    return self.set_toast(Toast::processing(current, total), None);
                }
                GenerationEvent::Complete { count } => {
                    let dismiss = self.set_toast(
                        Toast::success(format!("Generated features for {} images", count)),
                        Some(TOAST_DISMISS),
                    );
                    let recheck = self.update(Message::CheckFeatures);
                    return Command::batch(vec![dismiss, recheck]);
                }
                GenerationEvent::Failed(message) => {
                    self.gallery_error = Some(format!("Error: {}", message));
                    self.clear_toast();
                }
            },
            Message::GenerationStreamClosed => {}
            Message::GenerationFinished(result) => {
                self.generating = false;
                self.generation_rx = None;
                if let Err(error) = result {
                    self.gallery_error = Some(format!("Error: {}", error));
                    self.clear_toast();
                }
            }
            Message::OpenModal { filename, caption } => {
                self.modal = Some(ModalView {
                    filename: filename.clone(),
                    caption,
                });
                self.modal_image = None;
                let loader = self.image_loader.clone();
                let url = self.client.image_url(&filename);
                return Command::perform(
                    async move { loader.load(&url).await.map_err(|e| e.to_string()) },
                    Message::ModalImageLoaded,
                );
            }
            Message::ModalImageLoaded(result) => match result {
                Ok(handle) => {
                    if self.modal.is_some() {
                        self.modal_image = Some(handle);
                    }
                }
                Err(error) => {
                    tracing::warn!("failed to load full image: {}", error);
                }
            },
            Message::CloseModal | Message::BackdropPressed => {
                self.modal = None;
                self.modal_image = None;
            }
            Message::ModalImagePressed => {}
            Message::EscapePressed => {
                if self.confirm.is_some() {
                    self.confirm = None;
                } else if self.modal.is_some() {
                    return self.update(Message::CloseModal);
                }
            }
            Message::ToastExpired(epoch) => {
                if epoch == self.toast_epoch {
                    self.toast = None;
                }
            }
        }
        Command::none()
    }

    fn subscription(&self) -> Subscription<Message> {
        let mut subs: Vec<Subscription<Message>> = Vec::new();

        if let Some(events_rx) = &self.generation_rx {
            let events_rx = events_rx.clone();
            subs.push(iced::subscription::unfold(
                "generation-progress",
                events_rx,
                |rx| async move {
                    let event = {
                        let mut lock = rx.lock().await;
                        lock.recv().await
                    };
                    let msg = match event {
                        Some(event) => Message::GenerationProgress(event),
                        None => Message::GenerationStreamClosed,
                    };
                    (msg, rx)
                },
            ));
        }

        subs.push(event::listen_with(|event, _status| match event {
            iced::Event::Keyboard(keyboard::Event::KeyPressed {
                key: keyboard::Key::Named(keyboard::key::Named::Escape),
                ..
            }) => Some(Message::EscapePressed),
            iced::Event::Window(_, window::Event::FileDropped(path)) => {
                Some(Message::FileDropped(path))
            }
            _ => None,
        }));

        Subscription::batch(subs)
    }

    fn view(&self) -> Element<Message> {
        if let Some(modal) = &self.modal {
            return modal::view(modal, self.modal_image.as_ref());
        }

        let mut tabs = row![text("PicSeek").size(24)]
            .spacing(Palette::SPACING)
            .align_items(iced::Alignment::Center);
        for tab in [Tab::Gallery, Tab::Search] {
            tabs = tabs.push(
                button(text(tab.to_string()))
                    .style(style::button_tab(self.active_tab == tab))
                    .on_press(Message::TabSelected(tab)),
            );
        }

        let content = match self.active_tab {
            Tab::Gallery => self.gallery_view(),
            Tab::Search => self.search_view(),
        };

        let mut base = column![tabs, content].spacing(Palette::SPACING);

        if let Some(action) = &self.confirm {
            base = base.push(self.confirm_view(action));
        }
        if let Some(toast) = &self.toast {
            base = base.push(toast::view(toast));
        }

        container(base)
            .width(Length::Fill)
            .height(Length::Fill)
            .padding(20)
            .into()
    }
}

impl PicSeekUI {
    fn gallery_view(&self) -> Element<Message> {
        let mut upload = button(text("Upload images")).style(style::button_primary());
        if self.batch.is_none() {
            upload = upload.on_press(Message::PickUploadFiles);
        }

        let mut generate = button(text("Generate features")).style(style::button_primary());
        if !self.generating {
            generate = generate.on_press(Message::GenerateFeatures);
        }

        let mut controls = row![upload, generate]
            .spacing(10)
            .align_items(iced::Alignment::Center);
        if !self.selected.is_empty() {
            controls = controls.push(
                button(text(format!("Delete selected ({})", self.selected.len())))
                    .style(style::button_outlined())
                    .on_press(Message::RequestDeleteSelected),
            );
        }
        if !self.tiles.is_empty() {
            controls = controls.push(
                button(text("Delete all"))
                    .style(style::button_outlined())
                    .on_press(Message::RequestDeleteAll),
            );
        }

        let mut col = column![controls].spacing(Palette::SPACING);

        if let Some(error) = &self.gallery_error {
            col = col.push(
                container(text(error.clone()).size(14))
                    .style(style::error_banner())
                    .padding(10)
                    .width(Length::Fill),
            );
        }

        if self.gallery_loading {
            col = col.push(text("Loading images...").size(16));
        } else if self.tiles.is_empty() {
            col = col.push(
                container(
                    column![
                        style::icon(MaterialSymbol::Image, 48, Palette::MUTED),
                        text("Library is empty").size(16),
                    ]
                    .spacing(10)
                    .align_items(iced::Alignment::Center),
                )
                .width(Length::Fill)
                .center_x()
                .padding(40),
            );
        } else {
            let mut rows = column![].spacing(gallery::TILE_SPACING as u16);
            let mut current = row![].spacing(gallery::TILE_SPACING as u16);
            let mut count = 0;
            for (index, tile) in self.tiles.iter().enumerate() {
                current = current.push(self.gallery_tile(index, tile));
                count += 1;
                if count == gallery::COLUMNS {
                    rows = rows.push(current);
                    current = row![].spacing(gallery::TILE_SPACING as u16);
                    count = 0;
                }
            }
            if count > 0 {
                rows = rows.push(current);
            }
            col = col.push(
                scrollable(rows)
                    .height(Length::Fill)
                    .on_scroll(|viewport| {
                        Message::GalleryScrolled(
                            viewport.absolute_offset().y,
                            viewport.bounds().height,
                        )
                    }),
            );
        }

        col.into()
    }

    fn gallery_tile<'a>(&'a self, index: usize, tile: &'a GalleryTile) -> Element<'a, Message> {
        let dimmed = !self.tile_window.visible.contains(&index);
        let size = Length::Fixed(gallery::TILE_SIZE);

        let thumb: Element<Message> = match self.thumbnails.get(&tile.filename) {
            Some(handle) => {
                let img = image(handle.clone()).width(size).height(size);
                if dimmed {
                    img.into()
                } else {
                    mouse_area(img)
                        .on_press(Message::OpenModal {
                            filename: tile.filename.clone(),
                            caption: tile.filename.clone(),
                        })
                        .into()
                }
            }
            None => container(style::icon(MaterialSymbol::Image, 32, Palette::MUTED))
                .width(size)
                .height(size)
                .center_x()
                .center_y()
                .into(),
        };

        let mut footer = row![]
            .spacing(5)
            .align_items(iced::Alignment::Center);
        if tile.is_original {
            footer = footer.push(
                container(text("Original").size(12))
                    .style(style::original_badge())
                    .padding(4),
            );
            footer = footer.push(
                button(style::icon(MaterialSymbol::Close, 14, Palette::MUTED))
                    .style(style::button_outlined()),
            );
        } else {
            let filename = tile.filename.clone();
            let mut tick = checkbox("", self.selected.contains(&tile.filename))
                .style(style::checkbox_primary());
            if !dimmed {
                tick = tick.on_toggle(move |checked| {
                    Message::TileToggled(filename.clone(), checked)
                });
            }
            footer = footer.push(tick);
            let mut delete =
                button(style::icon(MaterialSymbol::Close, 14, Palette::ERROR))
                    .style(style::button_outlined());
            if !dimmed {
                delete = delete.on_press(Message::RequestDeleteImage(tile.filename.clone()));
            }
            footer = footer.push(delete);
        }
        footer = footer.push(text(tile.filename.clone()).size(12));

        container(column![thumb, footer].spacing(5))
            .style(if dimmed {
                style::card_dimmed()
            } else {
                style::card()
            })
            .padding(5)
            .into()
    }

    fn search_view(&self) -> Element<Message> {
        let mut modes = row![].spacing(10);
        for mode in SearchMode::ALL {
            modes = modes.push(
                button(text(mode.to_string()))
                    .style(style::button_tab(self.search_mode == mode))
                    .on_press(Message::SearchModeChanged(mode)),
            );
        }

        let input: Element<Message> = match self.search_mode {
            SearchMode::Upload => {
                let mut pick = button(text("Choose an image...")).style(style::button_primary());
                if !self.searching {
                    pick = pick.on_press(Message::PickSearchFile);
                }
                row![pick, text("or drop an image on the window").size(14)]
                    .spacing(10)
                    .align_items(iced::Alignment::Center)
                    .into()
            }
            SearchMode::Library => {
                let selection = match &self.pending_input {
                    Some(SearchInput::Library(filename)) => Some(filename.clone()),
                    _ => None,
                };
                pick_list(
                    self.library_options.clone(),
                    selection,
                    Message::LibraryImagePicked,
                )
                .placeholder("-- Choose an image --")
                .into()
            }
        };

        let preview: Element<Message> = match &self.preview {
            Some(handle) => image(handle.clone())
                .width(Length::Fixed(gallery::TILE_SIZE))
                .height(Length::Fixed(gallery::TILE_SIZE))
                .into(),
            None => container(text("No image selected").size(14))
                .width(Length::Fixed(gallery::TILE_SIZE))
                .height(Length::Fixed(gallery::TILE_SIZE))
                .center_x()
                .center_y()
                .style(style::card())
                .into(),
        };

        let mut go = button(text("Search")).style(style::button_primary());
        if self.search_enabled() {
            go = go.on_press(Message::PerformSearch);
        }
        let mut clear = button(text("Clear")).style(style::button_outlined());
        if self.pending_input.is_some() && !self.searching {
            clear = clear.on_press(Message::ClearSearchInput);
        }

        let mut col = column![
            modes,
            input,
            row![preview, column![go, clear].spacing(10)].spacing(Palette::SPACING),
        ]
        .spacing(Palette::SPACING);

        if !self.features_exist {
            col = col.push(
                container(
                    text("No feature index found. Generate features from the Gallery tab first.")
                        .size(14),
                )
                .style(style::warning_banner())
                .padding(10)
                .width(Length::Fill),
            );
        }

        if let Some(error) = &self.search_error {
            col = col.push(
                container(text(error.clone()).size(14))
                    .style(style::error_banner())
                    .padding(10)
                    .width(Length::Fill),
            );
        }

        if !self.results.is_empty() {
            let mut rows = column![].spacing(gallery::TILE_SPACING as u16);
            let mut current = row![].spacing(gallery::TILE_SPACING as u16);
            let mut count = 0;
            for (index, hit) in self.results.iter().enumerate() {
                current = current.push(self.result_card(index, hit));
                count += 1;
                if count == gallery::COLUMNS {
                    rows = rows.push(current);
                    current = row![].spacing(gallery::TILE_SPACING as u16);
                    count = 0;
                }
            }
            if count > 0 {
                rows = rows.push(current);
            }
            col = col.push(
                scrollable(rows)
                    .height(Length::Fill)
                    .on_scroll(|viewport| {
                        Message::ResultsScrolled(
                            viewport.absolute_offset().y,
                            viewport.bounds().height,
                        )
                    }),
            );
        }

        col.into()
    }

    fn result_card<'a>(&'a self, index: usize, hit: &'a SearchHit) -> Element<'a, Message> {
        let dimmed = !self.results_window.visible.contains(&index);
        let size = Length::Fixed(gallery::TILE_SIZE);
        let label = search::format_similarity(hit.similarity);

        let picture: Element<Message> = match self.result_images.get(&hit.filename) {
            Some(handle) => {
                let img = image(handle.clone()).width(size).height(size);
                if dimmed {
                    img.into()
                } else {
                    mouse_area(img)
                        .on_press(Message::OpenModal {
                            filename: hit.filename.clone(),
                            caption: format!("{} ({} match)", hit.filename, label),
                        })
                        .into()
                }
            }
            None => container(style::icon(MaterialSymbol::Image, 32, Palette::MUTED))
                .width(size)
                .height(size)
                .center_x()
                .center_y()
                .into(),
        };

        let info = column![
            row![
                text(hit.filename.clone()).size(13).width(Length::Fill),
                text(label).size(13),
            ]
            .spacing(5),
            progress_bar(0.0..=100.0, search::percentage(hit.similarity))
                .style(style::similarity_bar())
                .height(Length::Fixed(6.0)),
        ]
        .spacing(5)
        .width(size);

        container(column![picture, info].spacing(5))
            .style(if dimmed {
                style::card_dimmed()
            } else {
                style::card()
            })
            .padding(5)
            .into()
    }

    fn confirm_view<'a>(&'a self, action: &'a ConfirmAction) -> Element<'a, Message> {
        let prompt = match action {
            ConfirmAction::DeleteOne(filename) => format!("Delete {}?", filename),
            ConfirmAction::DeleteSelected => {
                format!("Delete {} selected image(s)?", self.selected.len())
            }
            ConfirmAction::DeleteAll => format!(
                "Delete all {} uploaded image(s)? Original images will be preserved.",
                self.deletable().len()
            ),
        };

        container(
            column![
                text(prompt).size(16),
                row![
                    button(text("Delete"))
                        .style(style::button_primary())
                        .on_press(Message::ConfirmPending),
                    button(text("Cancel"))
                        .style(style::button_outlined())
                        .on_press(Message::CancelPending),
                ]
                .spacing(10),
            ]
            .spacing(10),
        )
        .style(style::card())
        .padding(10)
        .into()
    }
}
