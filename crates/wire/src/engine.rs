//! Engine configuration, descriptor cache, and entry points
//!
//! An [`Engine`] is a frozen [`Config`]: key-matching flags plus the
//! extensions that rewrite struct descriptors. Descriptors are built on first
//! use of a type and cached for the engine's lifetime.
//!
//! # Engine scope
//!
//! Serde drives nested values through plain `Serialize`/`Deserialize` impls,
//! which have no way to receive the engine. Every entry point therefore
//! pushes its engine onto a thread-local stack for the duration of the call;
//! tagged structs look up [`Engine::current`] to find their descriptor.
//! Outside any call the process-wide [`global`] engine is used.
//!
//! # Example
//!
//! ```ignore
//! use tagjson_wire::{Config, TagExtension};
//!
//! let engine = Config::default()
//!     .disallow_unknown_fields(true)
//!     .with_extension(TagExtension)
//!     .build();
//! let bytes = engine.marshal(&record)?;
//! ```

use std::any::{Any, TypeId};
use std::cell::RefCell;
use std::fmt;
use std::io::{Read, Write};
use std::sync::Arc;

use dashmap::DashMap;
use once_cell::sync::Lazy;
use serde::de::{DeserializeOwned, Error as _};
use serde::Serialize;
use serde_json::de::IoRead;
use serde_json::{StreamDeserializer, Value};
use tracing::trace;

use crate::descriptor::{JsonStruct, TypedDescriptor};
use crate::error::{Error, Result};
use crate::extension::{Extension, TagExtension};
use crate::indent;

/// Engine configuration
///
/// The default is lenient: keys match case-insensitively when no exact
/// match exists, unknown keys are ignored, and no extensions run.
#[derive(Clone, Default)]
pub struct Config {
    pub(crate) case_sensitive: bool,
    pub(crate) disallow_unknown_fields: bool,
    extensions: Vec<Arc<dyn Extension>>,
}

impl Config {
    /// Match object keys to field names exactly
    pub fn case_sensitive(mut self, yes: bool) -> Self {
        self.case_sensitive = yes;
        self
    }

    /// Fail decoding when an object has a key no field matches
    pub fn disallow_unknown_fields(mut self, yes: bool) -> Self {
        self.disallow_unknown_fields = yes;
        self
    }

    /// Register an extension; extensions run in registration order
    pub fn with_extension(mut self, extension: impl Extension + 'static) -> Self {
        self.extensions.push(Arc::new(extension));
        self
    }

    /// Whether key matching is case sensitive
    pub fn is_case_sensitive(&self) -> bool {
        self.case_sensitive
    }

    /// Whether unknown keys are rejected
    pub fn disallows_unknown_fields(&self) -> bool {
        self.disallow_unknown_fields
    }

    /// Number of registered extensions
    pub fn extension_count(&self) -> usize {
        self.extensions.len()
    }

    /// Freeze into an engine
    pub fn build(self) -> Engine {
        Engine {
            inner: Arc::new(EngineInner {
                config: self,
                descriptors: DashMap::new(),
            }),
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("case_sensitive", &self.case_sensitive)
            .field("disallow_unknown_fields", &self.disallow_unknown_fields)
            .field("extensions", &self.extensions.len())
            .finish()
    }
}

struct EngineInner {
    config: Config,
    descriptors: DashMap<TypeId, Arc<dyn Any + Send + Sync>>,
}

/// A configured JSON engine
///
/// Cloning is cheap and clones share the descriptor cache.
#[derive(Clone)]
pub struct Engine {
    inner: Arc<EngineInner>,
}

static GLOBAL: Lazy<Engine> = Lazy::new(Engine::standard);

/// The process-wide engine: default config with [`TagExtension`]
pub fn global() -> &'static Engine {
    &GLOBAL
}

thread_local! {
    static SCOPE: RefCell<Vec<Engine>> = RefCell::new(Vec::new());
}

/// Pops the engine pushed by [`Engine::enter`]
struct ScopeGuard;

impl Drop for ScopeGuard {
    fn drop(&mut self) {
        SCOPE.with(|scope| {
            scope.borrow_mut().pop();
        });
    }
}

impl Engine {
    /// Default config with [`TagExtension`] registered
    pub fn standard() -> Self {
        Config::default().with_extension(TagExtension).build()
    }

    /// The engine in scope on this thread, or the global engine
    pub fn current() -> Engine {
        SCOPE
            .with(|scope| scope.borrow().last().cloned())
            .unwrap_or_else(|| global().clone())
    }

    /// The frozen configuration
    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    /// Descriptor for `S`, built on first request
    ///
    /// Concurrent first requests build the descriptor once; every caller
    /// gets the same `Arc`.
    pub fn descriptor<S: JsonStruct>(&self) -> Arc<TypedDescriptor<S>> {
        let id = TypeId::of::<S>();
        // Read first; the shard guard must be gone before `entry` locks it.
        let found = self.inner.descriptors.get(&id).map(|entry| Arc::clone(entry.value()));
        let cached = match found {
            Some(cached) => cached,
            None => {
                let entry = self.inner.descriptors.entry(id).or_insert_with(|| {
                    let built: Arc<dyn Any + Send + Sync> =
                        Arc::new(TypedDescriptor::<S>::build(&self.inner.config.extensions));
                    built
                });
                Arc::clone(entry.value())
            }
        };
        match cached.downcast::<TypedDescriptor<S>>() {
            Ok(descriptor) => descriptor,
            // unreachable while the cache is keyed by TypeId
            Err(_) => Arc::new(TypedDescriptor::build(&self.inner.config.extensions)),
        }
    }

    /// Number of struct types described so far
    pub fn cached_descriptors(&self) -> usize {
        self.inner.descriptors.len()
    }

    fn enter(&self) -> ScopeGuard {
        SCOPE.with(|scope| scope.borrow_mut().push(self.clone()));
        ScopeGuard
    }

    /// Encode `value` as compact JSON
    pub fn marshal<T: Serialize + ?Sized>(&self, value: &T) -> Result<Vec<u8>> {
        let _scope = self.enter();
        let bytes = serde_json::to_vec(value)?;
        trace!(len = bytes.len(), "marshalled value");
        Ok(bytes)
    }

    /// Encode `value` as a compact JSON string
    pub fn marshal_to_string<T: Serialize + ?Sized>(&self, value: &T) -> Result<String> {
        let _scope = self.enter();
        Ok(serde_json::to_string(value)?)
    }

    /// Encode `value` and indent the result (see [`indent::indent`])
    pub fn marshal_indent<T: Serialize + ?Sized>(
        &self,
        value: &T,
        prefix: &str,
        indent: &str,
    ) -> Result<Vec<u8>> {
        let compact = self.marshal(value)?;
        Ok(indent::reformat(&compact, prefix, indent))
    }

    /// Decode the JSON object in `data` onto an existing tagged struct
    ///
    /// Fields whose keys are absent keep their current values and `null`
    /// leaves `dest` untouched. Fields that are present are replaced.
    pub fn unmarshal<S: JsonStruct>(&self, data: &[u8], dest: &mut S) -> Result<()> {
        let value = serde_json::from_slice::<Value>(data)?;
        self.apply(value, dest)?;
        trace!(len = data.len(), "unmarshalled value");
        Ok(())
    }

    /// Decode `data` as a new value of any deserializable type
    pub fn from_slice<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T> {
        let _scope = self.enter();
        Ok(serde_json::from_slice(data)?)
    }

    fn apply<S: JsonStruct>(&self, value: Value, dest: &mut S) -> Result<()> {
        let _scope = self.enter();
        match value {
            Value::Object(object) => self
                .descriptor::<S>()
                .decode(dest, object, self.config())
                .map_err(serde_json::Error::custom)?,
            Value::Null => {}
            other => {
                return Err(Error::Json(serde_json::Error::custom(
                    tagjson_core::CodecError::mismatch("object", &other),
                )))
            }
        }
        Ok(())
    }

    /// Stream encoder writing to `writer`
    pub fn new_encoder<W: Write>(&self, writer: W) -> Encoder<W> {
        Encoder {
            engine: self.clone(),
            writer,
            prefix: String::new(),
            indent: String::new(),
        }
    }

    /// Stream decoder reading from `reader`
    pub fn new_decoder<R: Read>(&self, reader: R) -> Decoder<R> {
        Decoder {
            engine: self.clone(),
            stream: serde_json::Deserializer::from_reader(reader).into_iter(),
        }
    }
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("config", &self.inner.config)
            .field("descriptors", &self.inner.descriptors.len())
            .finish()
    }
}

/// Writes a sequence of JSON documents, one per line
pub struct Encoder<W> {
    engine: Engine,
    writer: W,
    prefix: String,
    indent: String,
}

impl<W: Write> Encoder<W> {
    /// Write `value` followed by a newline
    pub fn encode<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<()> {
        let mut bytes = self.engine.marshal(value)?;
        if !self.prefix.is_empty() || !self.indent.is_empty() {
            bytes = indent::reformat(&bytes, &self.prefix, &self.indent);
        }
        bytes.push(b'\n');
        self.writer.write_all(&bytes)?;
        Ok(())
    }

    /// Indent every following document; empty strings restore compact output
    pub fn set_indent(&mut self, prefix: &str, indent: &str) {
        self.prefix = prefix.to_string();
        self.indent = indent.to_string();
    }

    /// Unwrap the writer
    pub fn into_inner(self) -> W {
        self.writer
    }
}

/// Reads a sequence of whitespace-separated JSON documents
pub struct Decoder<R: Read> {
    engine: Engine,
    stream: StreamDeserializer<'static, IoRead<R>, Value>,
}

impl<R: Read> Decoder<R> {
    /// Decode the next document onto `dest`, as [`Engine::unmarshal`] does
    ///
    /// Returns [`Error::Eof`] once the input is exhausted.
    pub fn decode<S: JsonStruct>(&mut self, dest: &mut S) -> Result<()> {
        let value = self.next_document()?;
        self.engine.apply(value, dest)
    }

    /// Decode the next document as a new value of any deserializable type
    pub fn decode_value<T: DeserializeOwned>(&mut self) -> Result<T> {
        let value = self.next_document()?;
        let _scope = self.engine.enter();
        Ok(serde_json::from_value(value)?)
    }

    fn next_document(&mut self) -> Result<Value> {
        match self.stream.next() {
            Some(value) => Ok(value?),
            None => Err(Error::Eof),
        }
    }

    /// Byte offset just past the last decoded document
    pub fn byte_offset(&self) -> usize {
        self.stream.byte_offset()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{Field, StructDescriptor};
    use serde::Deserialize;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, Default, PartialEq)]
    struct Point {
        x: i64,
        y: i64,
    }

    impl JsonStruct for Point {
        fn fields() -> Vec<Field<Self>> {
            vec![
                Field::<Self>::new("x", "x", |s| &s.x, |s| &mut s.x),
                Field::<Self>::new("y", "y,hexstring", |s| &s.y, |s| &mut s.y),
            ]
        }
    }

    impl Serialize for Point {
        fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
            crate::descriptor::serialize_struct(self, serializer)
        }
    }

    impl<'de> Deserialize<'de> for Point {
        fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
            crate::descriptor::deserialize_struct(deserializer)
        }
    }

    struct Counting(Arc<AtomicUsize>);

    impl Extension for Counting {
        fn update_struct_descriptor(&self, _descriptor: &mut StructDescriptor) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    // === Config ===

    #[test]
    fn test_config_defaults_are_lenient() {
        let config = Config::default();
        assert!(!config.is_case_sensitive());
        assert!(!config.disallows_unknown_fields());
        assert_eq!(config.extension_count(), 0);
    }

    #[test]
    fn test_standard_engine_has_tag_extension() {
        assert_eq!(Engine::standard().config().extension_count(), 1);
        assert_eq!(global().config().extension_count(), 1);
    }

    // === Descriptor cache ===

    #[test]
    fn test_descriptor_cached() {
        let builds = Arc::new(AtomicUsize::new(0));
        let engine = Config::default()
            .with_extension(Counting(builds.clone()))
            .build();

        let first = engine.descriptor::<Point>();
        let second = engine.descriptor::<Point>();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(builds.load(Ordering::SeqCst), 1);
        assert_eq!(engine.cached_descriptors(), 1);
    }

    #[test]
    fn test_descriptor_built_once_under_concurrency() {
        let builds = Arc::new(AtomicUsize::new(0));
        let engine = Config::default()
            .with_extension(Counting(builds.clone()))
            .build();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let engine = engine.clone();
                std::thread::spawn(move || engine.descriptor::<Point>())
            })
            .collect();
        let descriptors: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        assert_eq!(builds.load(Ordering::SeqCst), 1);
        for descriptor in &descriptors[1..] {
            assert!(Arc::ptr_eq(&descriptors[0], descriptor));
        }
    }

    #[test]
    fn test_engines_do_not_share_cache() {
        let a = Engine::standard();
        let b = Engine::standard();
        a.descriptor::<Point>();
        assert_eq!(a.cached_descriptors(), 1);
        assert_eq!(b.cached_descriptors(), 0);
    }

    // === Scope ===

    #[test]
    fn test_scope_uses_calling_engine() {
        // no extension: `y` stays a plain number
        let bare = Config::default().build();
        let point = Point { x: 1, y: 255 };
        assert_eq!(bare.marshal_to_string(&point).unwrap(), r#"{"x":1,"y":255}"#);

        let standard = Engine::standard();
        assert_eq!(
            standard.marshal_to_string(&point).unwrap(),
            r#"{"x":1,"y":"00000000000000ff"}"#
        );
    }

    #[test]
    fn test_scope_restored_after_call() {
        let bare = Config::default().build();
        bare.marshal(&Point::default()).unwrap();
        SCOPE.with(|scope| assert!(scope.borrow().is_empty()));
        assert_eq!(Engine::current().config().extension_count(), 1);
    }

    // === Marshal / unmarshal ===

    #[test]
    fn test_unmarshal_keeps_absent_fields() {
        let engine = Engine::standard();
        let mut point = Point { x: 5, y: 5 };
        engine.unmarshal(br#"{"y":"10"}"#, &mut point).unwrap();
        assert_eq!(point, Point { x: 5, y: 16 });

        engine.unmarshal(b"null", &mut point).unwrap();
        assert_eq!(point, Point { x: 5, y: 16 });

        let err = engine.unmarshal(b"[1]", &mut point).unwrap_err();
        assert!(err.is_data());
        assert_eq!(point, Point { x: 5, y: 16 });
    }

    #[test]
    fn test_from_slice_builds_new_value() {
        let engine = Engine::standard();
        let point: Point = engine.from_slice(br#"{"y":"10"}"#).unwrap();
        assert_eq!(point, Point { x: 0, y: 16 });

        let points: Vec<Point> = engine.from_slice(br#"[{"x":1},null]"#).unwrap();
        assert_eq!(points, vec![Point { x: 1, y: 0 }, Point::default()]);
    }

    #[test]
    fn test_unmarshal_rejects_unknown_when_configured() {
        let engine = Config::default()
            .disallow_unknown_fields(true)
            .with_extension(TagExtension)
            .build();
        let mut point = Point::default();
        let err = engine.unmarshal(br#"{"z":1}"#, &mut point).unwrap_err();
        assert!(err.is_data());
        assert!(err.to_string().contains("unknown field `z`"));
    }

    #[test]
    fn test_unmarshal_syntax_error() {
        let mut point = Point::default();
        let err = Engine::standard().unmarshal(b"{", &mut point).unwrap_err();
        assert!(err.is_eof());
    }

    #[test]
    fn test_marshal_indent() {
        let out = Engine::standard()
            .marshal_indent(&Point { x: 1, y: 0 }, "", "  ")
            .unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "{\n  \"x\": 1,\n  \"y\": \"0\"\n}"
        );
    }

    // === Streams ===

    #[test]
    fn test_encoder_writes_lines() {
        let mut encoder = Engine::standard().new_encoder(Vec::new());
        encoder.encode(&Point { x: 1, y: 1 }).unwrap();
        encoder.encode(&[1, 2]).unwrap();
        assert_eq!(
            String::from_utf8(encoder.into_inner()).unwrap(),
            "{\"x\":1,\"y\":\"0000000000000001\"}\n[1,2]\n"
        );
    }

    #[test]
    fn test_encoder_indent() {
        let mut encoder = Engine::standard().new_encoder(Vec::new());
        encoder.set_indent(">", "\t");
        encoder.encode(&vec![1]).unwrap();
        assert_eq!(
            String::from_utf8(encoder.into_inner()).unwrap(),
            "[\n>\t1\n>]\n"
        );
    }

    #[test]
    fn test_decoder_reads_documents_then_eof() {
        let input = br#"{"x":1,"y":"ff"} {"x":2}
            {"X":3,"Y":"0"}"#;
        let mut decoder = Engine::standard().new_decoder(&input[..]);

        let mut point = Point::default();
        decoder.decode(&mut point).unwrap();
        assert_eq!(point, Point { x: 1, y: 255 });
        // absent `y` keeps the previous document's value
        decoder.decode(&mut point).unwrap();
        assert_eq!(point, Point { x: 2, y: 255 });
        decoder.decode(&mut point).unwrap();
        assert_eq!(point, Point { x: 3, y: 0 });

        let err = decoder.decode(&mut point).unwrap_err();
        assert!(matches!(err, Error::Eof));
    }

    #[test]
    fn test_decoder_values() {
        let mut decoder = Engine::standard().new_decoder(&b"[1,2] {\"y\":\"ff\"}"[..]);
        let numbers: Vec<i64> = decoder.decode_value().unwrap();
        assert_eq!(numbers, vec![1, 2]);
        let point: Point = decoder.decode_value().unwrap();
        assert_eq!(point, Point { x: 0, y: 255 });
        assert!(decoder.decode_value::<Point>().unwrap_err().is_eof());
    }

    #[test]
    fn test_decoder_syntax_error() {
        let mut decoder = Engine::standard().new_decoder(&b"{\"x\":]"[..]);
        let mut point = Point::default();
        assert!(decoder.decode(&mut point).unwrap_err().is_syntax());
    }
}
