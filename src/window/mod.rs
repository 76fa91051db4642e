//! Save, open and export flows of a shell window.
//!
//! Every flow is an `async` function driven by the [`Bridge`]; actions start
//! them fire-and-forget. A [`SaveGuard`] keeps two saves from writing the
//! same file at once, and is swapped for a fresh one whenever the save
//! location starts naming a different file.

mod chooser;
mod guard;
mod types;


use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use log::{debug, error, info, warn};

pub use chooser::{document_request, export_format_for, export_name_for, export_request};
pub use guard::{SaveGuard, SaveGuardHold};
pub use types::{SaveState, ShellError, WindowOptions};

use crate::bridge::{Bridge, promise};
use crate::config::Action;
use crate::format::{SaveFormat, decode, encode};
use crate::native::{
    AsyncFiles, ChooserAction, ChooserRequest, DialogResponse, FileChooser, SaveLocation,
    ShellDependencies, StreamId, WebContent, WindowControl,
};
use crate::protocol::SaveDataProtocol;
use crate::signals::SubscriptionId;

/// A window hosting one editor document.
///
/// Cheap to clone; clones share the same state.
#[derive(Clone)]
pub struct ShellWindow {
    inner: Rc<WindowState>,
}

struct WindowState {
    bridge: Bridge,
    protocol: Rc<SaveDataProtocol>,
    files: AsyncFiles,
    content: Rc<dyn WebContent>,
    chooser: Rc<dyn FileChooser>,
    window: Rc<dyn WindowControl>,
    options: WindowOptions,

    save_location: RefCell<Option<SaveLocation>>,
    save_guard: RefCell<SaveGuard>,
    /// Held while a chooser is presented; the host's dialog is modal.
    chooser_guard: SaveGuard,
    export_last: RefCell<Option<SaveLocation>>,
    close_on_save: Cell<bool>,

    save_data_subscription: SubscriptionId,
    initialized_subscription: SubscriptionId,
}

impl Drop for WindowState {
    fn drop(&mut self) {
        let events = self.content.events();
        events.save_data.unsubscribe(self.save_data_subscription);
        events.initialized.unsubscribe(self.initialized_subscription);
    }
}

impl ShellWindow {
    pub fn new(deps: ShellDependencies, bridge: Bridge, options: WindowOptions) -> Self {
        let protocol = Rc::new(SaveDataProtocol::new(
            deps.content.clone(),
            options.unknown_nonce,
            options.nonce_bound,
        ));

        let events = deps.content.events();
        let weak: Weak<SaveDataProtocol> = Rc::downgrade(&protocol);
        let save_data_subscription = events.save_data.subscribe(move |message| {
            let Some(protocol) = weak.upgrade() else {
                return;
            };
            if let Err(err) = protocol.handle_message(message) {
                warn!("Ignoring save data message: {}", err);
            }
        });
        let weak = Rc::downgrade(&protocol);
        let initialized_subscription = events.initialized.subscribe(move |_: &()| {
            if let Some(protocol) = weak.upgrade() {
                protocol.content_initialized();
            }
        });

        if options.fullscreen {
            deps.window.set_fullscreen(true);
        }

        Self {
            inner: Rc::new(WindowState {
                bridge,
                protocol,
                files: AsyncFiles::new(deps.files),
                content: deps.content,
                chooser: deps.chooser,
                window: deps.window,
                close_on_save: Cell::new(options.close_on_save),
                options,
                save_location: RefCell::new(None),
                save_guard: RefCell::new(SaveGuard::default()),
                chooser_guard: SaveGuard::default(),
                export_last: RefCell::new(None),
                save_data_subscription,
                initialized_subscription,
            }),
        }
    }

    pub fn bridge(&self) -> &Bridge {
        &self.inner.bridge
    }

    pub fn protocol(&self) -> &SaveDataProtocol {
        &self.inner.protocol
    }

    pub fn save_location(&self) -> Option<SaveLocation> {
        self.inner.save_location.borrow().clone()
    }

    pub fn export_target(&self) -> Option<SaveLocation> {
        self.inner.export_last.borrow().clone()
    }

    pub fn is_saving(&self) -> bool {
        self.inner.save_guard.borrow().is_running()
    }

    pub fn close_on_save(&self) -> bool {
        self.inner.close_on_save.get()
    }

    pub fn state(&self) -> SaveState {
        match self.save_location() {
            None => SaveState::NoLocation,
            Some(location) if self.is_saving() => SaveState::Saving(location),
            Some(location) => SaveState::HasLocation(location),
        }
    }

    /// Runs a window action. Document actions start in the background and
    /// report failures to the log.
    pub fn activate(&self, action: Action) {
        debug!("Action: {:?}", action);
        let window = self.clone();
        let bridge = &self.inner.bridge;
        match action {
            Action::Save => {
                bridge.spawn_detached("Save", async move { window.save().await });
            }
            Action::SaveAs => {
                bridge.spawn_detached("Save as", async move { window.save_as().await });
            }
            Action::Open => {
                bridge.spawn_detached("Open", async move { window.open().await });
            }
            Action::Export => {
                bridge.spawn_detached("Export", async move { window.export().await });
            }
            Action::Print => self.inner.window.print(),
            Action::ToggleFullscreen => self.inner.window.toggle_fullscreen(),
            Action::Quit => self.inner.window.close(),
        }
    }

    /// Opens `location` before the window is shown, draining the host loop
    /// until the file has been handed to the editor.
    pub fn open_initial(&self, location: SaveLocation) -> Result<(), ShellError> {
        let window = self.clone();
        self.inner
            .bridge
            .run_sync(async move { window.open_file(location).await })
    }

    /// Saves to the current location, or asks for one first.
    pub async fn save(&self) -> Result<(), ShellError> {
        if self.save_location().is_none() {
            return self.save_as().await;
        }
        let saved = self.perform_save().await?;
        if saved && self.inner.close_on_save.get() {
            info!("Closing after save");
            self.inner.window.close();
        }
        Ok(())
    }

    pub async fn save_as(&self) -> Result<(), ShellError> {
        let request = document_request(
            ChooserAction::Save,
            self.save_location().as_ref(),
            &self.inner.options.untitled_name,
        );
        let Some(location) = self.choose(request).await? else {
            debug!("Save as cancelled");
            return Ok(());
        };
        self.set_save_location(location).await?;
        self.perform_save().await?;
        self.inner.close_on_save.set(false);
        Ok(())
    }

    pub async fn open(&self) -> Result<(), ShellError> {
        let request = document_request(
            ChooserAction::Open,
            self.save_location().as_ref(),
            &self.inner.options.untitled_name,
        );
        let Some(location) = self.choose(request).await? else {
            debug!("Open cancelled");
            return Ok(());
        };
        self.open_file(location).await
    }

    pub async fn export(&self) -> Result<(), ShellError> {
        let request = {
            let last = self.inner.export_last.borrow();
            let current = self.inner.save_location.borrow();
            export_request(
                last.as_ref(),
                current.as_ref(),
                &self.inner.options.untitled_name,
                &self.inner.options.export_fallback_stem,
            )
        };
        let Some(target) = self.choose(request).await? else {
            debug!("Export cancelled");
            return Ok(());
        };
        *self.inner.export_last.borrow_mut() = Some(target.clone());

        let format = export_format_for(&target);
        let bytes = self.fetch_document(format, true).await?;
        debug!("Exporting {} bytes as {} to {}", bytes.len(), format, target);
        self.inner.files.replace_contents(&target, bytes).await?;
        info!("Exported {}", target);
        Ok(())
    }

    /// Makes `location` the save target. A location naming a different file
    /// than before gets a fresh save guard.
    pub async fn set_save_location(&self, location: SaveLocation) -> Result<(), ShellError> {
        let current = self.save_location();
        if let Some(current) = current {
            let old = self.inner.files.query_identity(&current).await?;
            let new = self.inner.files.query_identity(&location).await?;
            if old != new {
                debug!("Save target changed from {} to {}", current, location);
                *self.inner.save_guard.borrow_mut() = SaveGuard::default();
            }
        }
        *self.inner.save_location.borrow_mut() = Some(location);
        Ok(())
    }

    /// Loads `location` into the editor. A file that cannot be read is
    /// logged and leaves the editor untouched.
    pub async fn open_file(&self, location: SaveLocation) -> Result<(), ShellError> {
        self.set_save_location(location.clone()).await?;
        let bytes = match self.inner.files.load_contents(&location).await {
            Ok(bytes) => bytes,
            Err(err) => {
                error!("Failed to open '{}': {}", location.uri(), err);
                return Ok(());
            }
        };
        let payload = encode(location.format(), &bytes)?;
        self.inner.protocol.load(&payload)?;
        info!("Opened {}", location);
        Ok(())
    }

    /// Writes the document to the save location. Returns `false` when another
    /// save of the same file was already running and this one backed off.
    async fn perform_save(&self) -> Result<bool, ShellError> {
        let guard = self.inner.save_guard.borrow().clone();
        let Some(_hold) = guard.try_acquire() else {
            debug!("Save already in progress, skipping");
            return Ok(false);
        };
        let location = self.save_location().ok_or(ShellError::NoSaveLocation)?;

        let stream = self.inner.files.replace(&location).await?;
        if let Err(err) = self.write_document(stream, location.format()).await {
            if let Err(discard_err) = self.inner.files.discard(stream).await {
                warn!("Failed to discard partial save of {}: {}", location, discard_err);
            }
            return Err(err);
        }
        info!("Saved {}", location);
        Ok(true)
    }

    async fn write_document(&self, stream: StreamId, format: SaveFormat) -> Result<(), ShellError> {
        let bytes = self.fetch_document(format, false).await?;
        let written = self.inner.files.write(stream, bytes).await?;
        debug!("Wrote {} bytes", written);
        self.inner.files.close(stream).await?;
        Ok(())
    }

    async fn fetch_document(&self, format: SaveFormat, export: bool) -> Result<Vec<u8>, ShellError> {
        let response = self.inner.protocol.request(format, export).await?;
        Ok(decode(format, &response)?)
    }

    /// Presents a chooser and waits for the user's pick. Answers carry no
    /// request id, so while one chooser is open any other is refused and
    /// reported as cancelled.
    async fn choose(&self, request: ChooserRequest) -> Result<Option<SaveLocation>, ShellError> {
        let Some(_open) = self.inner.chooser_guard.try_acquire() else {
            info!("A file dialog is already open, ignoring '{}'", request.accept_label);
            return Ok(None);
        };
        let chooser = self.inner.chooser.clone();
        let response = promise(move |resolver| {
            chooser
                .responses()
                .subscribe_once(move |response: &DialogResponse| resolver.resolve(response.clone()));
            chooser.present(&request);
        })
        .await?;

        Ok(match response {
            DialogResponse::Accepted(location) => Some(location),
            DialogResponse::Cancelled => None,
        })
    }
}
