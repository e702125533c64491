use decorum::{cached, CacheKey, Canonicalize, KeyError};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Canonicalize)]
struct Point {
    x: i32,
    y: i32,
}

#[derive(Canonicalize)]
struct Pair(String, u8);

#[derive(Canonicalize)]
struct Marker;

#[derive(Canonicalize)]
struct Request {
    path: String,
    params: HashMap<String, String>,
    #[canonicalize(skip)]
    #[allow(dead_code)]
    request_id: u64,
}

#[derive(Canonicalize)]
enum Shape {
    Circle { radius: u32 },
    Rect(u32, u32),
    Empty,
    Tagged(#[canonicalize(skip)] u64, String),
}

#[derive(Canonicalize)]
struct Wrapper<T> {
    inner: T,
}

#[test]
fn test_named_struct() {
    let key = Point { x: 1, y: 2 }.canonicalize().unwrap();
    assert_eq!(
        key,
        CacheKey::Seq(vec![
            CacheKey::Str("Point".to_string()),
            CacheKey::Int(1),
            CacheKey::Int(2),
        ])
    );
}

#[test]
fn test_tuple_and_unit_structs() {
    assert_eq!(
        Pair("a".to_string(), 7).canonicalize().unwrap(),
        CacheKey::Seq(vec![
            CacheKey::Str("Pair".to_string()),
            CacheKey::Str("a".to_string()),
            CacheKey::Int(7),
        ])
    );
    assert_eq!(
        Marker.canonicalize().unwrap(),
        CacheKey::Seq(vec![CacheKey::Str("Marker".to_string())])
    );
}

#[test]
fn test_skipped_field_ignored() {
    let params: HashMap<String, String> = [("q".to_string(), "rust".to_string())]
        .into_iter()
        .collect();
    let first = Request {
        path: "/search".to_string(),
        params: params.clone(),
        request_id: 1,
    };
    let second = Request {
        path: "/search".to_string(),
        params,
        request_id: 2,
    };
    assert_eq!(first.canonicalize().unwrap(), second.canonicalize().unwrap());
}

#[test]
fn test_enum_variants_tagged() {
    assert_eq!(
        Shape::Circle { radius: 3 }.canonicalize().unwrap(),
        CacheKey::Seq(vec![CacheKey::Str("Shape::Circle".to_string()), CacheKey::Int(3)])
    );
    assert_eq!(
        Shape::Empty.canonicalize().unwrap(),
        CacheKey::Seq(vec![CacheKey::Str("Shape::Empty".to_string())])
    );
    // Same field values, different variants
    assert_ne!(
        Shape::Rect(3, 3).canonicalize().unwrap(),
        Shape::Circle { radius: 3 }.canonicalize().unwrap()
    );
    assert_eq!(
        Shape::Tagged(1, "t".into()).canonicalize().unwrap(),
        Shape::Tagged(2, "t".into()).canonicalize().unwrap()
    );
}

#[test]
fn test_generic_struct_and_key_errors() {
    let ok = Wrapper { inner: vec![1.5_f64] }.canonicalize().unwrap();
    assert_eq!(
        ok,
        CacheKey::Seq(vec![
            CacheKey::Str("Wrapper".to_string()),
            CacheKey::Seq(vec![CacheKey::float(1.5).unwrap()]),
        ])
    );

    let err = Wrapper { inner: f64::NAN }.canonicalize().unwrap_err();
    assert_eq!(err, KeyError::NanFloat);
}

#[test]
fn test_derived_type_as_cached_argument() {
    static CALLS: AtomicUsize = AtomicUsize::new(0);

    #[cached(size = 4)]
    fn area(shape: Shape) -> u32 {
        CALLS.fetch_add(1, Ordering::SeqCst);
        match shape {
            Shape::Circle { radius } => 3 * radius * radius,
            Shape::Rect(w, h) => w * h,
            Shape::Empty | Shape::Tagged(..) => 0,
        }
    }

    assert_eq!(area(Shape::Rect(2, 5)), 10);
    assert_eq!(area(Shape::Rect(2, 5)), 10);
    assert_eq!(area(Shape::Circle { radius: 2 }), 12);
    assert_eq!(CALLS.load(Ordering::SeqCst), 2);
}
