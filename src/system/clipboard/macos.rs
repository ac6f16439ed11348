//! NSPasteboard access
//!
//! Every entry point wraps its Objective-C calls in an autorelease pool.

use cocoa::base::{id, nil, BOOL, YES};
use cocoa::foundation::{NSAutoreleasePool, NSData, NSString};
use objc::{class, msg_send, sel, sel_impl};
use std::ffi::{c_void, CStr};

const PNG_TYPE: &str = "public.png";
const TIFF_TYPE: &str = "public.tiff";
const TEXT_TYPE: &str = "public.utf8-plain-text";

// NSBitmapImageFileTypePNG
const PNG_FILE_TYPE: u64 = 4;

struct Pool(id);

impl Pool {
    unsafe fn new() -> Self {
        Pool(NSAutoreleasePool::new(nil))
    }
}

impl Drop for Pool {
    fn drop(&mut self) {
        unsafe {
            let _: () = msg_send![self.0, drain];
        }
    }
}

unsafe fn general_pasteboard() -> id {
    msg_send![class!(NSPasteboard), generalPasteboard]
}

unsafe fn ns_string(value: &str) -> id {
    NSString::alloc(nil).init_str(value).autorelease()
}

unsafe fn data_bytes(data: id) -> Vec<u8> {
    let length: usize = msg_send![data, length];
    let bytes: *const u8 = msg_send![data, bytes];
    if bytes.is_null() || length == 0 {
        return Vec::new();
    }
    std::slice::from_raw_parts(bytes, length).to_vec()
}

/// NSPasteboard `changeCount`
pub fn change_count() -> i64 {
    unsafe {
        let _pool = Pool::new();
        let pasteboard = general_pasteboard();
        msg_send![pasteboard, changeCount]
    }
}

/// PNG bytes of the image slot. TIFF content is converted to PNG.
pub fn read_png() -> Option<Vec<u8>> {
    unsafe {
        let _pool = Pool::new();
        let pasteboard = general_pasteboard();

        let png: id = msg_send![pasteboard, dataForType: ns_string(PNG_TYPE)];
        if png != nil {
            return Some(data_bytes(png));
        }

        let tiff: id = msg_send![pasteboard, dataForType: ns_string(TIFF_TYPE)];
        if tiff == nil {
            return None;
        }

        let bitmap: id = msg_send![class!(NSBitmapImageRep), imageRepWithData: tiff];
        if bitmap == nil {
            return None;
        }
        let properties: id = msg_send![class!(NSDictionary), dictionary];
        let png: id = msg_send![bitmap, representationUsingType: PNG_FILE_TYPE properties: properties];
        if png == nil {
            None
        } else {
            Some(data_bytes(png))
        }
    }
}

pub fn read_text() -> Option<String> {
    unsafe {
        let _pool = Pool::new();
        let pasteboard = general_pasteboard();

        let text: id = msg_send![pasteboard, stringForType: ns_string(TEXT_TYPE)];
        if text == nil {
            return None;
        }
        let utf8 = text.UTF8String();
        if utf8.is_null() {
            return None;
        }
        Some(CStr::from_ptr(utf8).to_string_lossy().into_owned())
    }
}

pub fn write_text(text: &str) -> bool {
    unsafe {
        let _pool = Pool::new();
        let pasteboard = general_pasteboard();
        let _: i64 = msg_send![pasteboard, clearContents];
        let ok: BOOL = msg_send![pasteboard, setString: ns_string(text) forType: ns_string(TEXT_TYPE)];
        ok == YES
    }
}

pub fn write_png(bytes: &[u8]) -> bool {
    unsafe {
        let _pool = Pool::new();
        let pasteboard = general_pasteboard();
        let _: i64 = msg_send![pasteboard, clearContents];

        let data: id = NSData::dataWithBytes_length_(
            nil,
            bytes.as_ptr() as *const c_void,
            bytes.len() as u64,
        );
        let ok: BOOL = msg_send![pasteboard, setData: data forType: ns_string(PNG_TYPE)];
        ok == YES
    }
}
