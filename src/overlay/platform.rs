use crate::overlay::asset::Glyph;
use crate::overlay::canvas::{DoubleBufferedCanvas, DrawContext, Surface};
use crate::overlay::content::ContentProvider;
use crate::overlay::model::{Color, Point, Rect, TextStyle};
use crate::overlay::scheduler::{IdleScheduler, IdleTarget};
use crate::overlay::window::{ExStyle, WindowBackend};
use anyhow::{anyhow, Context};
use std::mem;
use std::ptr;
use std::sync::Once;
use std::time::Duration;
use windows::core::{w, PCWSTR};
use windows::Win32::Foundation::{
    COLORREF, HANDLE, HINSTANCE, HWND, LPARAM, LRESULT, POINT, RECT, WPARAM,
};
use windows::Win32::Graphics::Gdi::{
    BeginPaint, BitBlt, CreateCompatibleBitmap, CreateCompatibleDC, CreateDIBSection,
    CreateFontIndirectW, CreateSolidBrush, DeleteDC, DeleteObject, EndPaint, FillRect, GetDC,
    InvalidateRect, ReleaseDC, SelectObject, SetBkMode, SetTextColor, TextOutW, BITMAPINFO,
    BITMAPINFOHEADER, BI_RGB, DIB_RGB_COLORS, HBITMAP, HBRUSH, HDC, HFONT, HGDIOBJ, LOGFONTW,
    NONANTIALIASED_QUALITY, PAINTSTRUCT, SRCCOPY, TRANSPARENT,
};
use windows::Win32::System::LibraryLoader::GetModuleHandleW;
use windows::Win32::UI::WindowsAndMessaging::{
    BringWindowToTop, CreateWindowExW, DefWindowProcW, DispatchMessageW, GetCursorPos,
    GetSystemMetrics, GetWindowLongPtrW, PeekMessageW, RegisterClassW,
    SetLayeredWindowAttributes, SetWindowLongPtrW, SetWindowPos, ShowWindow, SystemParametersInfoW,
    TranslateMessage, GWLP_USERDATA, GWL_EXSTYLE, HMENU, HWND_TOPMOST, LWA_COLORKEY, MSG,
    PM_NOREMOVE, PM_REMOVE, SM_CXSCREEN, SM_CYSCREEN, SPI_GETWORKAREA, SWP_NOACTIVATE,
    SWP_NOMOVE, SWP_NOSIZE, SW_SHOWNOACTIVATE, SYSTEM_PARAMETERS_INFO_UPDATE_FLAGS, WM_ERASEBKGND,
    WM_PAINT, WM_QUIT, WNDCLASSW, WS_CHILD, WS_EX_LAYERED, WS_EX_TOOLWINDOW, WS_EX_TOPMOST,
    WS_POPUP, WS_VISIBLE,
};

const OVERLAY_CLASS: PCWSTR = w!("DesktopHelperOverlay");
const CANVAS_CLASS: PCWSTR = w!("DesktopHelperCanvas");

fn colorref(color: Color) -> COLORREF {
    COLORREF(color.to_colorref())
}

/// Global cursor position in screen coordinates.
pub fn cursor_position() -> Option<Point> {
    let mut pt = POINT::default();
    unsafe { GetCursorPos(&mut pt) }
        .ok()
        .map(|_| Point::new(pt.x, pt.y))
}

/// Non-blocking check for any message queued for this thread.
pub fn is_message_pending() -> bool {
    let mut msg = MSG::default();
    unsafe { PeekMessageW(&mut msg, HWND::default(), 0, 0, PM_NOREMOVE) }.as_bool()
}

fn primary_work_area() -> Rect {
    let mut rc = RECT::default();
    let queried = unsafe {
        SystemParametersInfoW(
            SPI_GETWORKAREA,
            0,
            Some(&mut rc as *mut RECT as *mut core::ffi::c_void),
            SYSTEM_PARAMETERS_INFO_UPDATE_FLAGS(0),
        )
    };
    if queried.is_ok() && rc.right > rc.left && rc.bottom > rc.top {
        return Rect::new(rc.left, rc.top, rc.right - rc.left, rc.bottom - rc.top);
    }
    tracing::warn!("work area query failed; using full screen size");
    let (width, height) = unsafe { (GetSystemMetrics(SM_CXSCREEN), GetSystemMetrics(SM_CYSCREEN)) };
    Rect::new(0, 0, width, height)
}

/// GDI back buffer plus the caches it needs to draw the helper.
pub struct GdiSurface {
    mem_dc: HDC,
    back: HBITMAP,
    old_back: HGDIOBJ,
    size: (i32, i32),
    brush: HBRUSH,
    brush_color: Color,
    target: HDC,
    glyph: Option<GlyphBitmap>,
    font: Option<(TextStyle, HFONT)>,
}

struct GlyphBitmap {
    source: usize,
    dc: HDC,
    dib: HBITMAP,
    old: HGDIOBJ,
    size: (i32, i32),
}

impl GdiSurface {
    fn new(hwnd: HWND, size: (i32, i32), key: Color) -> anyhow::Result<Self> {
        unsafe {
            let window_dc = GetDC(hwnd);
            if window_dc.0.is_null() {
                return Err(anyhow!("GetDC failed for canvas window"));
            }
            let mem_dc = CreateCompatibleDC(window_dc);
            let back = CreateCompatibleBitmap(window_dc, size.0, size.1);
            ReleaseDC(hwnd, window_dc);
            if mem_dc.0.is_null() || back.0.is_null() {
                return Err(anyhow!("unable to allocate {}x{} back buffer", size.0, size.1));
            }
            let old_back = SelectObject(mem_dc, back);
            Ok(Self {
                mem_dc,
                back,
                old_back,
                size,
                brush: CreateSolidBrush(colorref(key)),
                brush_color: key,
                target: HDC::default(),
                glyph: None,
                font: None,
            })
        }
    }

    fn set_target(&mut self, hdc: HDC) {
        self.target = hdc;
    }

    fn glyph_dc(&mut self, glyph: &Glyph) -> Option<(HDC, (i32, i32))> {
        let source = glyph.bgra().as_ptr() as usize;
        if let Some(cached) = &self.glyph {
            if cached.source == source {
                return Some((cached.dc, cached.size));
            }
        }
        if let Some(old) = self.glyph.take() {
            old.release();
        }
        let size = (glyph.width() as i32, glyph.height() as i32);
        let mut bmi = BITMAPINFO::default();
        bmi.bmiHeader = BITMAPINFOHEADER {
            biSize: mem::size_of::<BITMAPINFOHEADER>() as u32,
            biWidth: size.0,
            biHeight: -size.1,
            biPlanes: 1,
            biBitCount: 32,
            biCompression: BI_RGB.0,
            ..Default::default()
        };
        unsafe {
            let dc = CreateCompatibleDC(self.mem_dc);
            let mut bits: *mut core::ffi::c_void = ptr::null_mut();
            let dib = CreateDIBSection(dc, &bmi, DIB_RGB_COLORS, &mut bits, HANDLE::default(), 0)
                .ok()?;
            if bits.is_null() {
                let _ = DeleteObject(dib);
                let _ = DeleteDC(dc);
                return None;
            }
            let len = glyph.bgra().len();
            ptr::copy_nonoverlapping(glyph.bgra().as_ptr(), bits as *mut u8, len);
            let old = SelectObject(dc, dib);
            self.glyph = Some(GlyphBitmap {
                source,
                dc,
                dib,
                old,
                size,
            });
        }
        Some((self.glyph.as_ref()?.dc, size))
    }

    fn font_for(&mut self, style: &TextStyle) -> HFONT {
        if let Some((cached, font)) = &self.font {
            if cached == style {
                return *font;
            }
        }
        if let Some((_, old)) = self.font.take() {
            unsafe {
                let _ = DeleteObject(old);
            }
        }
        let mut lf = LOGFONTW {
            // Point size at 96 DPI, negative for character height.
            lfHeight: -(style.size * 96 / 72),
            lfWeight: 400,
            lfQuality: NONANTIALIASED_QUALITY,
            ..Default::default()
        };
        for (dst, src) in lf
            .lfFaceName
            .iter_mut()
            .zip(style.font_family.encode_utf16().take(31))
        {
            *dst = src;
        }
        let font = unsafe { CreateFontIndirectW(&lf) };
        self.font = Some((style.clone(), font));
        font
    }
}

impl GlyphBitmap {
    fn release(self) {
        unsafe {
            SelectObject(self.dc, self.old);
            let _ = DeleteObject(self.dib);
            let _ = DeleteDC(self.dc);
        }
    }
}

impl DrawContext for GdiSurface {
    fn draw_glyph(&mut self, glyph: &Glyph, at: Point) {
        let Some((src, (w, h))) = self.glyph_dc(glyph) else {
            return;
        };
        unsafe {
            let _ = BitBlt(self.mem_dc, at.x, at.y, w, h, src, 0, 0, SRCCOPY);
        }
    }

    fn draw_text(&mut self, text: &str, at: Point, style: &TextStyle) {
        let font = self.font_for(style);
        let wide: Vec<u16> = text.encode_utf16().collect();
        unsafe {
            let old = SelectObject(self.mem_dc, font);
            SetBkMode(self.mem_dc, TRANSPARENT);
            SetTextColor(self.mem_dc, colorref(style.color));
            let _ = TextOutW(self.mem_dc, at.x, at.y, &wide);
            SelectObject(self.mem_dc, old);
        }
    }
}

impl Surface for GdiSurface {
    fn clear(&mut self, color: Color) {
        unsafe {
            if color != self.brush_color {
                let _ = DeleteObject(self.brush);
                self.brush = CreateSolidBrush(colorref(color));
                self.brush_color = color;
            }
            let rc = RECT {
                left: 0,
                top: 0,
                right: self.size.0,
                bottom: self.size.1,
            };
            FillRect(self.mem_dc, &rc, self.brush);
        }
    }

    fn back_buffer(&mut self) -> &mut dyn DrawContext {
        self
    }

    fn present(&mut self) {
        if self.target.0.is_null() {
            return;
        }
        unsafe {
            let _ = BitBlt(
                self.target,
                0,
                0,
                self.size.0,
                self.size.1,
                self.mem_dc,
                0,
                0,
                SRCCOPY,
            );
        }
    }
}

impl Drop for GdiSurface {
    fn drop(&mut self) {
        if let Some(glyph) = self.glyph.take() {
            glyph.release();
        }
        unsafe {
            if let Some((_, font)) = self.font.take() {
                let _ = DeleteObject(font);
            }
            let _ = DeleteObject(self.brush);
            SelectObject(self.mem_dc, self.old_back);
            let _ = DeleteObject(self.back);
            let _ = DeleteDC(self.mem_dc);
        }
    }
}

/// Everything the canvas window procedure needs during `WM_PAINT`.
struct PaintHost {
    canvas: DoubleBufferedCanvas<GdiSurface>,
    provider: ContentProvider,
}

impl PaintHost {
    fn paint(&mut self, hdc: HDC) {
        self.canvas.surface_mut().set_target(hdc);
        self.canvas.paint(&self.provider);
        self.canvas.surface_mut().set_target(HDC::default());
    }
}

unsafe extern "system" fn overlay_wndproc(
    hwnd: HWND,
    msg: u32,
    wparam: WPARAM,
    lparam: LPARAM,
) -> LRESULT {
    unsafe { DefWindowProcW(hwnd, msg, wparam, lparam) }
}

unsafe extern "system" fn canvas_wndproc(
    hwnd: HWND,
    msg: u32,
    wparam: WPARAM,
    lparam: LPARAM,
) -> LRESULT {
    match msg {
        WM_ERASEBKGND => LRESULT(1),
        WM_PAINT => {
            let mut ps = PAINTSTRUCT::default();
            let hdc = unsafe { BeginPaint(hwnd, &mut ps) };
            let host = unsafe { GetWindowLongPtrW(hwnd, GWLP_USERDATA) } as *mut PaintHost;
            if !hdc.0.is_null() && !host.is_null() {
                unsafe { (*host).paint(hdc) };
            }
            unsafe {
                let _ = EndPaint(hwnd, &ps);
            }
            LRESULT(0)
        }
        _ => unsafe { DefWindowProcW(hwnd, msg, wparam, lparam) },
    }
}

fn register_classes(hinstance: HINSTANCE, key: Color) {
    static REGISTER: Once = Once::new();
    REGISTER.call_once(|| unsafe {
        let overlay = WNDCLASSW {
            hInstance: hinstance,
            lpszClassName: OVERLAY_CLASS,
            lpfnWndProc: Some(overlay_wndproc),
            hbrBackground: CreateSolidBrush(colorref(key)),
            ..Default::default()
        };
        let _ = RegisterClassW(&overlay);
        let canvas = WNDCLASSW {
            hInstance: hinstance,
            lpszClassName: CANVAS_CLASS,
            lpfnWndProc: Some(canvas_wndproc),
            ..Default::default()
        };
        let _ = RegisterClassW(&canvas);
    });
}

/// Win32 implementation of [`WindowBackend`]: a layered, colorkeyed popup
/// with a single child window acting as the double-buffered canvas.
pub struct Win32Backend {
    provider: Option<ContentProvider>,
    hwnd: HWND,
    canvas_hwnd: HWND,
    host: *mut PaintHost,
}

impl Win32Backend {
    pub fn new(provider: ContentProvider) -> Self {
        Self {
            provider: Some(provider),
            hwnd: HWND::default(),
            canvas_hwnd: HWND::default(),
            host: ptr::null_mut(),
        }
    }

    fn current_ex_style(&self) -> ExStyle {
        ExStyle(unsafe { GetWindowLongPtrW(self.hwnd, GWL_EXSTYLE) } as u32)
    }
}

impl WindowBackend for Win32Backend {
    fn work_area(&self) -> Rect {
        primary_work_area()
    }

    fn create(&mut self, bounds: Rect, key: Color) -> anyhow::Result<ExStyle> {
        let provider = self
            .provider
            .take()
            .ok_or_else(|| anyhow!("overlay window already created"))?;
        let hinstance: HINSTANCE = unsafe { GetModuleHandleW(PCWSTR::null()) }
            .context("GetModuleHandleW")?
            .into();
        register_classes(hinstance, key);

        let hwnd = unsafe {
            CreateWindowExW(
                WS_EX_LAYERED | WS_EX_TOPMOST | WS_EX_TOOLWINDOW,
                OVERLAY_CLASS,
                w!("DesktopHelper"),
                WS_POPUP,
                bounds.x,
                bounds.y,
                bounds.width,
                bounds.height,
                HWND::default(),
                HMENU::default(),
                hinstance,
                None,
            )
        }
        .context("creating overlay window")?;
        self.hwnd = hwnd;

        unsafe { SetLayeredWindowAttributes(hwnd, colorref(key), 0, LWA_COLORKEY) }
            .context("applying transparency key")?;

        let canvas_hwnd = unsafe {
            CreateWindowExW(
                Default::default(),
                CANVAS_CLASS,
                PCWSTR::null(),
                WS_CHILD | WS_VISIBLE,
                0,
                0,
                bounds.width,
                bounds.height,
                hwnd,
                HMENU::default(),
                hinstance,
                None,
            )
        }
        .context("creating canvas window")?;
        self.canvas_hwnd = canvas_hwnd;

        let surface = GdiSurface::new(canvas_hwnd, (bounds.width, bounds.height), key)?;
        let host = Box::new(PaintHost {
            canvas: DoubleBufferedCanvas::new(surface, key),
            provider,
        });
        self.host = Box::into_raw(host);
        unsafe {
            SetWindowLongPtrW(canvas_hwnd, GWLP_USERDATA, self.host as isize);
            let _ = ShowWindow(hwnd, SW_SHOWNOACTIVATE);
        }
        self.bring_to_top();
        Ok(self.current_ex_style())
    }

    fn set_ex_style(&mut self, style: ExStyle) {
        unsafe {
            SetWindowLongPtrW(self.hwnd, GWL_EXSTYLE, style.0 as isize);
        }
    }

    fn bring_to_top(&mut self) {
        unsafe {
            let _ = SetWindowPos(
                self.hwnd,
                HWND_TOPMOST,
                0,
                0,
                0,
                0,
                SWP_NOMOVE | SWP_NOSIZE | SWP_NOACTIVATE,
            );
        }
    }

    fn bring_canvas_to_front(&mut self) {
        unsafe {
            let _ = BringWindowToTop(self.canvas_hwnd);
        }
    }

    fn invalidate(&mut self) {
        unsafe {
            let _ = InvalidateRect(self.canvas_hwnd, None, false);
        }
    }
}

impl Drop for Win32Backend {
    fn drop(&mut self) {
        if !self.host.is_null() {
            unsafe {
                SetWindowLongPtrW(self.canvas_hwnd, GWLP_USERDATA, 0);
                drop(Box::from_raw(self.host));
            }
            self.host = ptr::null_mut();
        }
    }
}

/// Host message loop for the overlay thread. Dispatches everything queued,
/// then hands the idle thread to the scheduler until new messages arrive.
/// Returns when `WM_QUIT` is received.
pub fn run_message_loop<T, P, S>(target: &mut T, scheduler: &mut IdleScheduler<P, S>)
where
    T: IdleTarget,
    P: FnMut() -> bool,
    S: FnMut(Duration),
{
    let mut msg = MSG::default();
    loop {
        while unsafe { PeekMessageW(&mut msg, HWND::default(), 0, 0, PM_REMOVE) }.as_bool() {
            if msg.message == WM_QUIT {
                tracing::info!("overlay message loop finished");
                return;
            }
            unsafe {
                let _ = TranslateMessage(&msg);
                DispatchMessageW(&msg);
            }
        }
        scheduler.tick(target);
    }
}

#[cfg(test)]
mod windows_tests {
    use super::*;

    #[test]
    fn work_area_is_non_empty() {
        let area = primary_work_area();
        assert!(area.width > 0 && area.height > 0);
    }

    #[test]
    fn empty_queue_reports_no_pending_message() {
        assert!(!is_message_pending());
    }
}
