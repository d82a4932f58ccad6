use std::cmp::Ordering;

use super::Value;

/// Position of a value's type class in the backend's total order.
#[must_use]
pub const fn type_rank(v: &Value) -> u8 {
    match v {
        Value::Null => 0,
        Value::Boolean(_) => 1,
        Value::Integer(_) | Value::Double(_) => 2,
        Value::Timestamp(_) => 3,
        Value::String(_) => 4,
        Value::Bytes(_) => 5,
        Value::Reference(_) => 6,
        Value::GeoPoint(_) => 7,
        Value::Array(_) => 8,
        Value::Vector(_) => 9,
        Value::Map(_) => 10,
        Value::Sentinel(_) => 11,
    }
}

/// Total order over values matching server-side result ordering: type class first, then
/// value within the class.
#[must_use]
pub fn compare_values(a: &Value, b: &Value) -> Ordering {
    use Value as V;
    let ra = type_rank(a);
    let rb = type_rank(b);
    if ra != rb {
        return ra.cmp(&rb);
    }
    match (a, b) {
        (V::Boolean(x), V::Boolean(y)) => x.cmp(y),
        (V::Integer(x), V::Integer(y)) => x.cmp(y),
        (V::Double(x), V::Double(y)) => compare_f64(*x, *y),
        (V::Integer(x), V::Double(y)) => compare_i64_f64(*x, *y),
        (V::Double(x), V::Integer(y)) => compare_i64_f64(*y, *x).reverse(),
        (V::Timestamp(x), V::Timestamp(y)) => x.cmp(y),
        (V::String(x), V::String(y)) => x.cmp(y),
        (V::Bytes(x), V::Bytes(y)) => x.cmp(y),
        (V::Reference(x), V::Reference(y)) => x.split('/').cmp(y.split('/')),
        (V::GeoPoint(x), V::GeoPoint(y)) => compare_f64(x.latitude, y.latitude)
            .then_with(|| compare_f64(x.longitude, y.longitude)),
        (V::Array(x), V::Array(y)) => compare_seq(x, y),
        (V::Vector(x), V::Vector(y)) => x.len().cmp(&y.len()).then_with(|| {
            x.iter()
                .zip(y)
                .map(|(p, q)| compare_f64(*p, *q))
                .find(|o| o.is_ne())
                .unwrap_or(Ordering::Equal)
        }),
        (V::Map(x), V::Map(y)) => {
            for ((ka, va), (kb, vb)) in x.iter().zip(y) {
                let o = ka.cmp(kb).then_with(|| compare_values(va, vb));
                if o.is_ne() {
                    return o;
                }
            }
            x.len().cmp(&y.len())
        }
        _ => Ordering::Equal,
    }
}

fn compare_seq(x: &[Value], y: &[Value]) -> Ordering {
    for (a, b) in x.iter().zip(y) {
        let o = compare_values(a, b);
        if o.is_ne() {
            return o;
        }
    }
    x.len().cmp(&y.len())
}

/// NaN sorts before every number and equal to itself; -0.0 equals 0.0.
fn compare_f64(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (false, false) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
    }
}

// 2^63, the first double above every i64.
const I64_UPPER: f64 = 9_223_372_036_854_775_808.0;

#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
fn compare_i64_f64(i: i64, d: f64) -> Ordering {
    if d.is_nan() {
        return Ordering::Greater;
    }
    if d >= I64_UPPER {
        return Ordering::Less;
    }
    if d < -I64_UPPER {
        return Ordering::Greater;
    }
    match compare_f64(i as f64, d) {
        // Both sides are integral here and `d` fits in i64, so compare exactly.
        Ordering::Equal => i.cmp(&(d as i64)),
        o => o,
    }
}
