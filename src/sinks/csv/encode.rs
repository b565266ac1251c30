use itoa::Buffer as ItoaBuffer;
use ryu::Buffer as RyuBuffer;

use crate::cell::CellValue;

/// Renders one cell into `out`. Missing cells become an empty field.
pub fn encode_value(
    value: &CellValue,
    out: &mut Vec<u8>,
    ryu: &mut RyuBuffer,
    itoa: &mut ItoaBuffer,
) {
    out.clear();
    match value {
        CellValue::Missing(_) => {}
        CellValue::Float(v) if !v.is_finite() => {
            // ryu renders non-finite values as `NaN`/`inf`; keep the data-frame spelling.
            let text = if v.is_nan() {
                "NaN"
            } else if v.is_sign_negative() {
                "-inf"
            } else {
                "inf"
            };
            out.extend_from_slice(text.as_bytes());
        }
        CellValue::Float(v) => {
            let s = ryu.format_finite(*v);
            out.extend_from_slice(s.as_bytes());
        }
        CellValue::Int(v) => {
            let s = itoa.format(*v);
            out.extend_from_slice(s.as_bytes());
        }
        CellValue::Text(s) => {
            out.extend_from_slice(s.as_bytes());
        }
    }
}
