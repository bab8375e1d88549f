// SPDX-License-Identifier: MIT

//! Conversions between CoreFoundation property-list objects and `plist::Value`.
//!
//! Only the types that can appear in a preferences domain are handled.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use core_foundation::{
    array::{
        CFArrayCreate, CFArrayGetCount, CFArrayGetTypeID, CFArrayGetValueAtIndex,
        kCFTypeArrayCallBacks,
    },
    base::{CFGetTypeID, CFRelease, CFRetain, CFTypeRef, TCFType, kCFAllocatorDefault},
    data::{CFDataCreate, CFDataGetBytePtr, CFDataGetLength, CFDataGetTypeID},
    date::{CFDateCreate, CFDateGetAbsoluteTime, CFDateGetTypeID},
    dictionary::{
        CFDictionaryCreate, CFDictionaryGetCount, CFDictionaryGetKeysAndValues,
        CFDictionaryGetTypeID, kCFTypeDictionaryKeyCallBacks, kCFTypeDictionaryValueCallBacks,
    },
    number::{
        CFBooleanGetTypeID, CFNumber, CFNumberCreate, CFNumberGetTypeID, CFNumberGetValue,
        CFNumberIsFloatType,
        kCFBooleanFalse, kCFBooleanTrue, kCFNumberDoubleType, kCFNumberSInt64Type,
    },
    string::{CFString, CFStringGetTypeID},
};
use plist::{Dictionary, Value};

// CFAbsoluteTime counts from 2001-01-01, 978307200 seconds after UNIX_EPOCH.
const APPLE_EPOCH_UNIX: f64 = 978_307_200.0;

unsafe fn cfnumber_to_value(r: CFTypeRef) -> Option<Value> {
    let num = unsafe { CFNumber::wrap_under_get_rule(r as _) };
    if unsafe { CFNumberIsFloatType(num.as_concrete_TypeRef()) } as i32 == 0 {
        let mut i64_val: i64 = 0;
        let ok = unsafe {
            CFNumberGetValue(
                num.as_concrete_TypeRef(),
                kCFNumberSInt64Type,
                &mut i64_val as *mut i64 as *mut _,
            ) as i32
                != 0
        };
        return ok.then(|| Value::Integer(i64_val.into()));
    }
    let mut f64_val: f64 = 0.0;
    let ok = unsafe {
        CFNumberGetValue(
            num.as_concrete_TypeRef(),
            kCFNumberDoubleType,
            &mut f64_val as *mut f64 as *mut _,
        ) as i32
            != 0
    };
    ok.then_some(Value::Real(f64_val))
}

unsafe fn cfarray_to_value(r: CFTypeRef) -> Value {
    let len = unsafe { CFArrayGetCount(r as _) };
    let mut out = Vec::with_capacity(len as usize);
    for i in 0..len {
        let item = unsafe { CFArrayGetValueAtIndex(r as _, i) };
        if let Some(v) = unsafe { cf_to_value(item as _) } {
            out.push(v);
        }
    }
    Value::Array(out)
}

unsafe fn cfdict_to_value(r: CFTypeRef) -> Value {
    let count = unsafe { CFDictionaryGetCount(r as _) } as usize;
    let mut keys: Vec<CFTypeRef> = vec![std::ptr::null(); count];
    let mut vals: Vec<CFTypeRef> = vec![std::ptr::null(); count];
    unsafe {
        CFDictionaryGetKeysAndValues(
            r as _,
            keys.as_mut_ptr() as *mut _,
            vals.as_mut_ptr() as *mut _,
        );
    }
    let mut dict = Dictionary::new();
    for (kref, vref) in keys.into_iter().zip(vals) {
        if kref.is_null() || unsafe { CFGetTypeID(kref) } != unsafe { CFStringGetTypeID() } {
            continue;
        }
        let key = unsafe { CFString::wrap_under_get_rule(kref as _).to_string() };
        if let Some(v) = unsafe { cf_to_value(vref) } {
            dict.insert(key, v);
        }
    }
    Value::Dictionary(dict)
}

/// Converts a borrowed CF object; `None` for null or unsupported types.
pub(crate) unsafe fn cf_to_value(r: CFTypeRef) -> Option<Value> {
    if r.is_null() {
        return None;
    }
    let tid = unsafe { CFGetTypeID(r) };

    if tid == unsafe { CFStringGetTypeID() } {
        Some(Value::String(unsafe {
            CFString::wrap_under_get_rule(r as _).to_string()
        }))
    } else if tid == unsafe { CFBooleanGetTypeID() } {
        Some(Value::Boolean(r == unsafe { kCFBooleanTrue } as CFTypeRef))
    } else if tid == unsafe { CFNumberGetTypeID() } {
        unsafe { cfnumber_to_value(r) }
    } else if tid == unsafe { CFArrayGetTypeID() } {
        Some(unsafe { cfarray_to_value(r) })
    } else if tid == unsafe { CFDictionaryGetTypeID() } {
        Some(unsafe { cfdict_to_value(r) })
    } else if tid == unsafe { CFDataGetTypeID() } {
        let len = unsafe { CFDataGetLength(r as _) };
        let ptr = unsafe { CFDataGetBytePtr(r as _) };
        Some(Value::Data(unsafe {
            std::slice::from_raw_parts(ptr, len as usize).to_vec()
        }))
    } else if tid == unsafe { CFDateGetTypeID() } {
        let unix = APPLE_EPOCH_UNIX + unsafe { CFDateGetAbsoluteTime(r as _) };
        let time = UNIX_EPOCH + Duration::from_secs_f64(unix.max(0.0));
        Some(Value::Date(plist::Date::from(time)))
    } else {
        None
    }
}

/// Converts to a CF object owned by the caller (+1 retain count).
pub(crate) fn value_to_cf(value: &Value) -> CFTypeRef {
    match value {
        Value::String(s) => {
            let cs = CFString::new(s);
            let ptr = cs.as_concrete_TypeRef() as CFTypeRef;
            unsafe { CFRetain(ptr) };
            ptr
        }

        Value::Integer(i) => {
            let n: i64 = i
                .as_signed()
                .or_else(|| i.as_unsigned().map(|u| u as i64))
                .unwrap_or_default();
            unsafe {
                CFNumberCreate(
                    kCFAllocatorDefault,
                    kCFNumberSInt64Type,
                    &n as *const i64 as *const _,
                ) as CFTypeRef
            }
        }

        Value::Real(f) => unsafe {
            CFNumberCreate(
                kCFAllocatorDefault,
                kCFNumberDoubleType,
                f as *const f64 as *const _,
            ) as CFTypeRef
        },

        Value::Boolean(b) => unsafe {
            let r = (if *b { kCFBooleanTrue } else { kCFBooleanFalse }) as CFTypeRef;
            CFRetain(r);
            r
        },

        Value::Array(items) => unsafe {
            let cf_items: Vec<CFTypeRef> = items.iter().map(value_to_cf).collect();
            let arr = CFArrayCreate(
                kCFAllocatorDefault,
                cf_items.as_ptr() as *const _,
                cf_items.len() as isize,
                &kCFTypeArrayCallBacks,
            ) as CFTypeRef;
            for &it in &cf_items {
                CFRelease(it);
            }
            arr
        },

        Value::Dictionary(map) => unsafe {
            let keys: Vec<CFTypeRef> = map
                .keys()
                .map(|k| value_to_cf(&Value::String(k.clone())))
                .collect();
            let values: Vec<CFTypeRef> = map.values().map(value_to_cf).collect();
            let dict = CFDictionaryCreate(
                kCFAllocatorDefault,
                keys.as_ptr() as *const _,
                values.as_ptr() as *const _,
                keys.len() as isize,
                &kCFTypeDictionaryKeyCallBacks,
                &kCFTypeDictionaryValueCallBacks,
            ) as CFTypeRef;
            for &r in keys.iter().chain(&values) {
                CFRelease(r);
            }
            dict
        },

        Value::Data(data) => unsafe {
            CFDataCreate(kCFAllocatorDefault, data.as_ptr(), data.len() as isize) as CFTypeRef
        },

        Value::Date(date) => {
            let time: SystemTime = date.clone().into();
            let unix = time
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_secs_f64())
                .unwrap_or_default();
            unsafe { CFDateCreate(kCFAllocatorDefault, unix - APPLE_EPOCH_UNIX) as CFTypeRef }
        }

        // Uid and future variants never occur in a preferences domain.
        _ => value_to_cf(&Value::String(String::new())),
    }
}
