//! Session binder — writes encoded curve data into the object graph of
//! a template `Session.plist`.
//!
//! The session is an `NSKeyedArchiver` property list: a flat
//! `$objects` array the archived object tree is spread across. The
//! curve blobs, counts and note title live at fixed slots of that
//! array. The slot layout is owned by the note application and is
//! version-fragile, so every slot is validated against the loaded
//! template before anything is written; a mismatch fails the whole
//! bind rather than silently writing to a wrong position.

use std::io::Cursor;

use plist::Value;

use crate::curves::CurveSet;

/// Slot of the curve-data dictionary inside `$objects`.
const CURVES_DICT_SLOT: usize = 8;
/// Slot holding the total fractional-width sample count.
const COUNT_FRACWIDTHS_SLOT: usize = 9;
/// Slot holding the stroke count.
const COUNT_CURVES_SLOT: usize = 10;
/// Slot holding the total point count.
const COUNT_POINTS_SLOT: usize = 11;
/// The note title sits this many slots before the end of `$objects`.
const TITLE_SLOT_FROM_END: usize = 8;

/// Keys of the curve-data dictionary, one per packed array.
const CURVE_FIELDS: [&str; 6] = [
    "curvescolors",
    "curvespoints",
    "curveswidth",
    "curvesnumpoints",
    "curvesfractionalwidths",
    "eventTokens",
];

/// Parse `Session.plist` bytes (binary or XML) into a value tree.
pub fn load_session(bytes: &[u8]) -> Result<Value, String> {
    Value::from_reader(Cursor::new(bytes))
        .map_err(|e| format!("Failed to parse Session.plist: {e}"))
}

/// Serialize a session value tree as a binary property list.
pub fn session_to_bytes(session: &Value) -> Result<Vec<u8>, String> {
    let mut cursor = Cursor::new(Vec::new());
    session
        .to_writer_binary(&mut cursor)
        .map_err(|e| format!("Failed to serialize Session.plist: {e}"))?;
    Ok(cursor.into_inner())
}

/// Bind a [`CurveSet`] and the note title into a loaded session.
///
/// Every target slot is checked first — the curve dictionary must
/// already carry all six keys, the count slots must hold integers and
/// the title slot a string — so a template with an unexpected layout
/// is rejected before any mutation.
pub fn bind_session(session: &mut Value, curves: CurveSet, name: &str) -> Result<(), String> {
    let objects = session
        .as_dictionary_mut()
        .and_then(|d| d.get_mut("$objects"))
        .and_then(Value::as_array_mut)
        .ok_or("Session template has no '$objects' array")?;

    // The title slot is addressed from the end and must land past the
    // count slots.
    if objects.len() < COUNT_POINTS_SLOT + TITLE_SLOT_FROM_END + 1 {
        return Err(format!(
            "Session template has only {} objects; the expected layout needs at least {}",
            objects.len(),
            COUNT_POINTS_SLOT + TITLE_SLOT_FROM_END + 1
        ));
    }
    let title_slot = objects.len() - TITLE_SLOT_FROM_END;

    // ── Validate every slot before touching any ─────────────────────
    let curve_dict = objects
        .get(CURVES_DICT_SLOT)
        .and_then(Value::as_dictionary)
        .ok_or_else(|| {
            format!("Session template slot {CURVES_DICT_SLOT} is not the curve-data dictionary")
        })?;
    for field in CURVE_FIELDS {
        if curve_dict.get(field).is_none() {
            return Err(format!(
                "Session template curve dictionary is missing the '{field}' field"
            ));
        }
    }
    for (slot, what) in [
        (COUNT_FRACWIDTHS_SLOT, "fractional-width count"),
        (COUNT_CURVES_SLOT, "curve count"),
        (COUNT_POINTS_SLOT, "point count"),
    ] {
        if !matches!(objects[slot], Value::Integer(_)) {
            return Err(format!(
                "Session template slot {slot} ({what}) does not hold an integer"
            ));
        }
    }
    if !matches!(objects[title_slot], Value::String(_)) {
        return Err(format!(
            "Session template slot {title_slot} (note title) does not hold a string"
        ));
    }

    // ── Write ───────────────────────────────────────────────────────
    let dict = objects
        .get_mut(CURVES_DICT_SLOT)
        .and_then(Value::as_dictionary_mut)
        .ok_or_else(|| {
            format!("Session template slot {CURVES_DICT_SLOT} is not the curve-data dictionary")
        })?;
    dict.insert("curvescolors".into(), Value::Data(curves.colors));
    dict.insert("curvespoints".into(), Value::Data(curves.points));
    dict.insert("curveswidth".into(), Value::Data(curves.width));
    dict.insert("curvesnumpoints".into(), Value::Data(curves.numpoints));
    dict.insert(
        "curvesfractionalwidths".into(),
        Value::Data(curves.fractionalwidths),
    );
    dict.insert("eventTokens".into(), Value::Data(curves.event_tokens));

    objects[COUNT_FRACWIDTHS_SLOT] =
        Value::Integer((curves.count_fracwidths as u64).into());
    objects[COUNT_CURVES_SLOT] = Value::Integer((curves.count_curves as u64).into());
    objects[COUNT_POINTS_SLOT] = Value::Integer((curves.count_points as u64).into());
    objects[title_slot] = Value::String(name.to_string());

    Ok(())
}
