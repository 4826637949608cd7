//! Partial-update helpers for edit commands: a field changes only when the
//! command carries a value for it. Empty strings count as absent.

pub fn patch_text(target: &mut String, value: Option<&str>) {
    if let Some(v) = value.filter(|v| !v.is_empty()) {
        *target = v.to_string();
    }
}

pub fn patch_opt_text(target: &mut Option<String>, value: Option<&str>) {
    if let Some(v) = value.filter(|v| !v.is_empty()) {
        *target = Some(v.to_string());
    }
}

pub fn patch<T: Clone>(target: &mut T, value: Option<&T>) {
    if let Some(v) = value {
        *target = v.clone();
    }
}

pub fn patch_opt<T: Clone>(target: &mut Option<T>, value: Option<&T>) {
    if let Some(v) = value {
        *target = Some(v.clone());
    }
}
