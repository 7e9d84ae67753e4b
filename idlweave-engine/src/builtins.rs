//! WebIDL builtins: primitive types, generic types, known extended attributes and the
//! global names accepted by `[Exposed]` and `[Global]`.
//!
//! Anchors follow the WebIDL specification's fixed scheme. Primitive types link to
//! `#idl-<name>` with spaces turned into hyphens (`#idl-unsigned-long-long`); generics have
//! their own lowercase anchors; extended attributes link to `#<Name>`.

const PRIMITIVE_TYPES: &[&str] = &[
    "any",
    "ArrayBuffer",
    "BigInt64Array",
    "BigUint64Array",
    "bigint",
    "boolean",
    "BufferSource",
    "byte",
    "ByteString",
    "DataView",
    "DOMException",
    "DOMString",
    "double",
    "float",
    "Float32Array",
    "Float64Array",
    "Function",
    "Int16Array",
    "Int32Array",
    "Int8Array",
    "long",
    "long long",
    "object",
    "octet",
    "short",
    "symbol",
    "Uint16Array",
    "Uint32Array",
    "Uint8Array",
    "Uint8ClampedArray",
    "undefined",
    "unrestricted double",
    "unrestricted float",
    "unsigned long",
    "unsigned long long",
    "unsigned short",
    "USVString",
    "void",
    "VoidFunction",
];

const GENERIC_TYPES: &[(&str, &str)] = &[
    ("sequence", "idl-sequence"),
    ("Promise", "idl-promise"),
    ("FrozenArray", "idl-frozen-array"),
    ("ObservableArray", "idl-observable-array"),
    ("record", "idl-record"),
    ("async_sequence", "idl-async-sequence"),
];

const EXTENDED_ATTRIBUTES: &[&str] = &[
    "AllowResizable",
    "AllowShared",
    "Clamp",
    "Constructor",
    "CrossOriginIsolated",
    "Default",
    "EnforceRange",
    "Exposed",
    "Global",
    "LegacyFactoryFunction",
    "LegacyLenientSetter",
    "LegacyLenientThis",
    "LegacyNamespace",
    "LegacyNoInterfaceObject",
    "LegacyNullToEmptyString",
    "LegacyOverrideBuiltIns",
    "LegacyTreatNonObjectAsNull",
    "LegacyUnenumerableNamedProperties",
    "LegacyUnforgeable",
    "LegacyWindowAlias",
    "NamedConstructor",
    "NewObject",
    "NoInterfaceObject",
    "PutForwards",
    "Replaceable",
    "SameObject",
    "SecureContext",
    "Unscopable",
];

const GLOBALS: &[(&str, &str)] = &[
    ("Window", "Window"),
    ("Worker", "WorkerGlobalScope"),
    ("DedicatedWorker", "DedicatedWorkerGlobalScope"),
    ("SharedWorker", "SharedWorkerGlobalScope"),
    ("ServiceWorker", "ServiceWorkerGlobalScope"),
    ("Worklet", "WorkletGlobalScope"),
    ("AudioWorklet", "AudioWorkletGlobalScope"),
    ("PaintWorklet", "PaintWorkletGlobalScope"),
    ("LayoutWorklet", "LayoutWorkletGlobalScope"),
    ("AnimationWorklet", "AnimationWorkletGlobalScope"),
];

/// Anchor of the `[Default] toJSON()` operation in the WebIDL specification.
pub const DEFAULT_TOJSON_ANCHOR: &str = "default-tojson-operation";

/// Anchor (without `#`) of a builtin type name, simple or generic.
pub fn type_anchor(name: &str) -> Option<String> {
    if let Some((_, anchor)) = GENERIC_TYPES.iter().find(|(generic, _)| *generic == name) {
        return Some(anchor.to_string());
    }
    PRIMITIVE_TYPES
        .contains(&name)
        .then(|| format!("idl-{}", name.replace(' ', "-")))
}

pub fn is_builtin_type(name: &str) -> bool {
    type_anchor(name).is_some()
}

/// Anchor (without `#`) of a known extended attribute.
pub fn extended_attribute_anchor(name: &str) -> Option<String> {
    EXTENDED_ATTRIBUTES
        .contains(&name)
        .then(|| name.to_string())
}

/// The global interface named by an `[Exposed]` or `[Global]` identifier.
pub fn global_interface(name: &str) -> Option<&'static str> {
    GLOBALS
        .iter()
        .find(|(global, _)| *global == name)
        .map(|(_, interface)| *interface)
}
