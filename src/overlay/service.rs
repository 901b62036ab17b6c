use crate::settings::OverlaySettings;
use crate::state::HelperState;
use std::sync::Arc;
use std::thread::JoinHandle;

pub const OVERLAY_THREAD_NAME: &str = "desktop-helper-overlay";

/// Start the overlay on its own thread and wait until its window exists.
///
/// A window that cannot be created is reported as an error here; the caller
/// is expected to treat it as fatal. Once running, the thread lives until the
/// process exits.
#[cfg(windows)]
pub fn spawn_overlay(
    state: Arc<HelperState>,
    settings: OverlaySettings,
) -> anyhow::Result<JoinHandle<()>> {
    use anyhow::anyhow;
    use std::sync::mpsc::sync_channel;

    let (ready_tx, ready_rx) = sync_channel::<Result<(), String>>(1);
    let handle = std::thread::Builder::new()
        .name(OVERLAY_THREAD_NAME.to_string())
        .spawn(move || {
            let result = run_overlay(state, &settings, || {
                let _ = ready_tx.send(Ok(()));
            });
            if let Err(err) = result {
                tracing::error!(error = %format!("{err:#}"), "overlay failed to start");
                let _ = ready_tx.send(Err(format!("{err:#}")));
            }
        })
        .map_err(|err| anyhow!("failed to spawn overlay thread: {err}"))?;

    match ready_rx.recv() {
        Ok(Ok(())) => Ok(handle),
        Ok(Err(err)) => Err(anyhow!(err)),
        Err(_) => Err(anyhow!("overlay thread exited before its window was created")),
    }
}

#[cfg(not(windows))]
pub fn spawn_overlay(
    _state: Arc<HelperState>,
    _settings: OverlaySettings,
) -> anyhow::Result<JoinHandle<()>> {
    Err(anyhow::anyhow!("the desktop overlay is only available on Windows"))
}

#[cfg(windows)]
fn run_overlay<F: FnOnce()>(
    state: Arc<HelperState>,
    settings: &OverlaySettings,
    on_ready: F,
) -> anyhow::Result<()> {
    use crate::overlay::asset::helper_glyph;
    use crate::overlay::content::ContentProvider;
    use crate::overlay::platform::{
        cursor_position, is_message_pending, run_message_loop, Win32Backend,
    };
    use crate::overlay::scheduler::IdleScheduler;
    use crate::overlay::window::OverlayWindow;

    let key = settings.transparency_key();
    let glyph = helper_glyph(settings.glyph_size, key);
    let provider = ContentProvider::new(state, glyph, Box::new(cursor_position))
        .with_anchor(settings.anchor)
        .with_text_style(settings.text_style())
        .with_label_offset(settings.label_offset);

    let mut window = OverlayWindow::create(Win32Backend::new(provider), key)?;
    on_ready();

    let mut scheduler =
        IdleScheduler::with_thread_sleep(settings.repaint_interval(), is_message_pending);
    tracing::info!(
        interval_ms = scheduler.interval().as_millis() as u64,
        anchor = ?settings.anchor,
        "overlay running"
    );
    run_message_loop(&mut window, &mut scheduler);
    Ok(())
}
