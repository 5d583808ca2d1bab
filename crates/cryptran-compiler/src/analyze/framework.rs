//! Static catalogue of the algorithm framework the corpus is written against.
//!
//! Classes with their inherited fields and method signatures, records with
//! their constructor field order, enums with their members, and the global
//! helper functions (`RegisterAlgorithm`, the `OpCodes` namespace). Names are
//! the framework's own spelling and are emitted verbatim by every target.

use std::sync::OnceLock;

use cryptran_core::Type;
use indexmap::IndexMap;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntryKind {
    Class,
    Record,
    Enum,
}

#[derive(Clone, Debug, PartialEq)]
pub struct MethodSig {
    pub params: Vec<(String, Type)>,
    pub ret: Type,
}

impl MethodSig {
    pub fn new(params: &[(&str, Type)], ret: Type) -> Self {
        Self {
            params: params
                .iter()
                .map(|(name, ty)| (name.to_string(), ty.clone()))
                .collect(),
            ret,
        }
    }

    pub fn param_type(&self, index: usize) -> Option<&Type> {
        self.params.get(index).map(|(_, ty)| ty)
    }

    pub fn as_type(&self) -> Type {
        Type::func(
            self.params.iter().map(|(_, ty)| ty.clone()).collect(),
            self.ret.clone(),
        )
    }
}

#[derive(Clone, Debug)]
pub struct FrameworkEntry {
    pub name: String,
    pub kind: EntryKind,
    pub base: Option<String>,
    /// Instance fields, in declaration order. For records this is also the
    /// positional constructor order.
    pub fields: IndexMap<String, Type>,
    pub methods: IndexMap<String, MethodSig>,
    /// Enum members.
    pub members: Vec<String>,
}

impl FrameworkEntry {
    fn new(name: &str, kind: EntryKind) -> Self {
        Self {
            name: name.to_string(),
            kind,
            base: None,
            fields: IndexMap::new(),
            methods: IndexMap::new(),
            members: Vec::new(),
        }
    }

    fn base(mut self, base: &str) -> Self {
        self.base = Some(base.to_string());
        self
    }

    fn field(mut self, name: &str, ty: Type) -> Self {
        self.fields.insert(name.to_string(), ty);
        self
    }

    fn method(mut self, name: &str, params: &[(&str, Type)], ret: Type) -> Self {
        self.methods.insert(name.to_string(), MethodSig::new(params, ret));
        self
    }

    fn members(mut self, members: &[&str]) -> Self {
        self.members = members.iter().map(|m| m.to_string()).collect();
        self
    }

    pub fn is_class(&self) -> bool {
        self.kind == EntryKind::Class
    }

    pub fn is_record(&self) -> bool {
        self.kind == EntryKind::Record
    }

    pub fn is_enum(&self) -> bool {
        self.kind == EntryKind::Enum
    }
}

#[derive(Debug)]
pub struct Framework {
    entries: IndexMap<String, FrameworkEntry>,
    /// Free functions, keyed by qualified name (`OpCodes.RotL32`).
    globals: IndexMap<String, MethodSig>,
}

/// The process-wide catalogue.
pub fn framework() -> &'static Framework {
    static CATALOGUE: OnceLock<Framework> = OnceLock::new();
    CATALOGUE.get_or_init(Framework::build)
}

impl Framework {
    pub fn get(&self, name: &str) -> Option<&FrameworkEntry> {
        self.entries.get(name)
    }

    pub fn entries(&self) -> impl Iterator<Item = &FrameworkEntry> {
        self.entries.values()
    }

    pub fn is_class(&self, name: &str) -> bool {
        self.get(name).is_some_and(FrameworkEntry::is_class)
    }

    pub fn is_record(&self, name: &str) -> bool {
        self.get(name).is_some_and(FrameworkEntry::is_record)
    }

    pub fn is_enum(&self, name: &str) -> bool {
        self.get(name).is_some_and(FrameworkEntry::is_enum)
    }

    /// `name` itself followed by its ancestors.
    pub fn lineage<'a>(&'a self, name: &str) -> impl Iterator<Item = &'a FrameworkEntry> + 'a {
        let mut next = self.get(name);
        std::iter::from_fn(move || {
            let entry = next?;
            next = entry.base.as_deref().and_then(|b| self.get(b));
            Some(entry)
        })
    }

    pub fn is_subtype(&self, name: &str, ancestor: &str) -> bool {
        self.lineage(name).any(|e| e.name == ancestor)
    }

    /// Field type, searching the base chain.
    pub fn field(&self, type_name: &str, field: &str) -> Option<&Type> {
        self.lineage(type_name).find_map(|e| e.fields.get(field))
    }

    /// Method signature and the entry that declares it.
    pub fn method(&self, type_name: &str, method: &str) -> Option<(&FrameworkEntry, &MethodSig)> {
        self.lineage(type_name)
            .find_map(|e| e.methods.get(method).map(|sig| (e, sig)))
    }

    pub fn enum_has(&self, enum_name: &str, member: &str) -> bool {
        self.get(enum_name)
            .is_some_and(|e| e.is_enum() && e.members.iter().any(|m| m == member))
    }

    /// Record whose field set equals `keys` exactly, in any order.
    pub fn record_matching<S: AsRef<str>>(&self, keys: &[S]) -> Option<&FrameworkEntry> {
        self.entries.values().filter(|e| e.is_record()).find(|e| {
            e.fields.len() == keys.len()
                && keys.iter().all(|k| e.fields.contains_key(k.as_ref()))
        })
    }

    /// Free function by qualified (`OpCodes.RotL32`) or bare name.
    pub fn global(&self, name: &str) -> Option<&MethodSig> {
        self.globals.get(name)
    }

    pub fn globals(&self) -> impl Iterator<Item = (&str, &MethodSig)> {
        self.globals.iter().map(|(k, v)| (k.as_str(), v))
    }

    fn insert(&mut self, entry: FrameworkEntry) {
        self.entries.insert(entry.name.clone(), entry);
    }

    fn global_fn(&mut self, name: &str, params: &[(&str, Type)], ret: Type) {
        self.globals.insert(name.to_string(), MethodSig::new(params, ret));
    }

    fn build() -> Self {
        use EntryKind::*;

        let mut kb = Self {
            entries: IndexMap::new(),
            globals: IndexMap::new(),
        };
        let named = |name: &str| Type::named(name);
        let (u32, bytes, string) = (Type::u32, Type::bytes, Type::string);

        kb.insert(FrameworkEntry::new("CategoryType", Enum).members(&[
            "ASYMMETRIC",
            "BLOCK",
            "STREAM",
            "HASH",
            "CHECKSUM",
            "COMPRESSION",
            "ENCODING",
            "CLASSICAL",
            "MAC",
            "KDF",
            "ECC",
            "MODE",
            "PADDING",
            "AEAD",
            "SPECIAL",
            "PQC",
            "RANDOM",
        ]));
        kb.insert(FrameworkEntry::new("SecurityStatus", Enum).members(&[
            "SECURE",
            "DEPRECATED",
            "BROKEN",
            "OBSOLETE",
            "EXPERIMENTAL",
            "EDUCATIONAL",
        ]));
        kb.insert(FrameworkEntry::new("ComplexityType", Enum).members(&[
            "BEGINNER",
            "INTERMEDIATE",
            "ADVANCED",
            "EXPERT",
            "RESEARCH",
        ]));
        kb.insert(FrameworkEntry::new("CountryCode", Enum).members(&[
            "US", "GB", "DE", "FR", "RU", "CN", "JP", "KR", "IL", "BE", "CH", "AU", "CA", "NL",
            "INTL", "ANCIENT", "UNKNOWN",
        ]));

        kb.insert(
            FrameworkEntry::new("KeySize", Record)
                .field("minSize", u32())
                .field("maxSize", u32())
                .field("stepSize", u32()),
        );
        kb.insert(
            FrameworkEntry::new("LinkItem", Record)
                .field("text", string())
                .field("uri", string()),
        );
        kb.insert(
            FrameworkEntry::new("Vulnerability", Record)
                .field("type", string())
                .field("text", string())
                .field("uri", string()),
        );
        kb.insert(
            FrameworkEntry::new("TestCase", Record)
                .field("input", bytes())
                .field("expected", bytes())
                .field("text", string())
                .field("uri", string()),
        );

        kb.insert(
            FrameworkEntry::new("Algorithm", Class)
                .field("name", string())
                .field("description", string())
                .field("inventor", string())
                .field("year", u32())
                .field("category", named("CategoryType"))
                .field("subCategory", string())
                .field("securityStatus", named("SecurityStatus"))
                .field("complexity", named("ComplexityType"))
                .field("country", named("CountryCode"))
                .field("documentation", Type::seq(named("LinkItem")))
                .field("references", Type::seq(named("LinkItem")))
                .field("knownVulnerabilities", Type::seq(named("Vulnerability")))
                .field("tests", Type::seq(named("TestCase")))
                .method(
                    "CreateInstance",
                    &[("isInverse", Type::bool())],
                    Type::optional(named("IAlgorithmInstance")),
                ),
        );
        kb.insert(FrameworkEntry::new("CryptoAlgorithm", Class).base("Algorithm"));
        kb.insert(FrameworkEntry::new("SymmetricCipherAlgorithm", Class).base("CryptoAlgorithm"));
        kb.insert(FrameworkEntry::new("AsymmetricCipherAlgorithm", Class).base("CryptoAlgorithm"));
        kb.insert(
            FrameworkEntry::new("BlockCipherAlgorithm", Class)
                .base("SymmetricCipherAlgorithm")
                .field("SupportedKeySizes", Type::seq(named("KeySize")))
                .field("SupportedBlockSizes", Type::seq(named("KeySize"))),
        );
        kb.insert(
            FrameworkEntry::new("StreamCipherAlgorithm", Class)
                .base("SymmetricCipherAlgorithm")
                .field("SupportedKeySizes", Type::seq(named("KeySize")))
                .field("SupportedNonceSizes", Type::seq(named("KeySize"))),
        );
        kb.insert(
            FrameworkEntry::new("HashFunctionAlgorithm", Class)
                .base("CryptoAlgorithm")
                .field("SupportedOutputSizes", Type::seq(named("KeySize"))),
        );
        kb.insert(
            FrameworkEntry::new("MacAlgorithm", Class)
                .base("CryptoAlgorithm")
                .field("SupportedMacSizes", Type::seq(named("KeySize"))),
        );
        kb.insert(FrameworkEntry::new("EncodingAlgorithm", Class).base("Algorithm"));
        kb.insert(FrameworkEntry::new("ChecksumAlgorithm", Class).base("Algorithm"));

        kb.insert(
            FrameworkEntry::new("IAlgorithmInstance", Class)
                .field("algorithm", named("Algorithm"))
                .field("isInverse", Type::bool())
                .method("Feed", &[("data", bytes())], Type::void())
                .method("Result", &[], bytes()),
        );
        kb.insert(
            FrameworkEntry::new("IBlockCipherInstance", Class)
                .base("IAlgorithmInstance")
                .field("BlockSize", u32())
                .field("KeySize", u32())
                .field("key", bytes()),
        );
        kb.insert(
            FrameworkEntry::new("IStreamCipherInstance", Class)
                .base("IAlgorithmInstance")
                .field("key", bytes())
                .field("nonce", bytes()),
        );
        kb.insert(
            FrameworkEntry::new("IHashFunctionInstance", Class)
                .base("IAlgorithmInstance")
                .field("OutputSize", u32()),
        );
        kb.insert(
            FrameworkEntry::new("IMacInstance", Class)
                .base("IAlgorithmInstance")
                .field("key", bytes())
                .field("OutputSize", u32()),
        );

        kb.global_fn("RegisterAlgorithm", &[("algorithm", named("Algorithm"))], Type::void());
        kb.global_fn("Find", &[("name", string())], named("Algorithm"));

        for width in [8u8, 16, 32] {
            let word = Type::int(width, false);
            for dir in ["L", "R"] {
                kb.global_fn(
                    &format!("OpCodes.Rot{dir}{width}"),
                    &[("value", word.clone()), ("positions", u32())],
                    word.clone(),
                );
            }
        }
        let b = Type::u8;
        for endian in ["BE", "LE"] {
            kb.global_fn(
                &format!("OpCodes.Pack32{endian}"),
                &[("b0", b()), ("b1", b()), ("b2", b()), ("b3", b())],
                u32(),
            );
            kb.global_fn(
                &format!("OpCodes.Pack16{endian}"),
                &[("b0", b()), ("b1", b())],
                Type::u16(),
            );
            kb.global_fn(&format!("OpCodes.Unpack32{endian}"), &[("word", u32())], bytes());
            kb.global_fn(&format!("OpCodes.Unpack16{endian}"), &[("word", Type::u16())], bytes());
        }
        kb.global_fn("OpCodes.XorArrays", &[("a", bytes()), ("b", bytes())], bytes());
        kb.global_fn("OpCodes.CopyArray", &[("data", bytes())], bytes());
        kb.global_fn("OpCodes.ClearArray", &[("data", bytes())], Type::void());
        kb.global_fn("OpCodes.CompareArrays", &[("a", bytes()), ("b", bytes())], Type::bool());
        kb.global_fn("OpCodes.AnsiToBytes", &[("text", string())], bytes());
        kb.global_fn("OpCodes.Hex8ToBytes", &[("hex", string())], bytes());
        kb.global_fn("OpCodes.BytesToHex8", &[("data", bytes())], string());
        kb.global_fn("OpCodes.GF256Mul", &[("a", b()), ("b", b())], b());

        kb
    }
}
