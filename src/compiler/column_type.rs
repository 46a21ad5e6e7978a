//! The closed column-type vocabulary and its field whitelist.

use std::fmt;

/// A key an attribute record may carry besides `name` and `type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Field {
    Length,
    Nullable,
    Unique,
    Default,
    After,
    Total,
    Places,
    Options,
    On,
    References,
    OnDelete,
    OnUpdate,
    Relationship,
}

impl Field {
    pub const ALL: [Field; 13] = [
        Field::Length,
        Field::Nullable,
        Field::Unique,
        Field::Default,
        Field::After,
        Field::Total,
        Field::Places,
        Field::Options,
        Field::On,
        Field::References,
        Field::OnDelete,
        Field::OnUpdate,
        Field::Relationship,
    ];

    /// The JSON key for this field.
    pub fn key(self) -> &'static str {
        match self {
            Field::Length => "length",
            Field::Nullable => "nullable",
            Field::Unique => "unique",
            Field::Default => "default",
            Field::After => "after",
            Field::Total => "total",
            Field::Places => "places",
            Field::Options => "options",
            Field::On => "on",
            Field::References => "references",
            Field::OnDelete => "onDelete",
            Field::OnUpdate => "onUpdate",
            Field::Relationship => "relationship",
        }
    }

    pub fn from_key(key: &str) -> Option<Field> {
        Field::ALL.into_iter().find(|f| f.key() == key)
    }
}

/// Groups of column types that share rendering, projection and fake-data rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Family {
    String,
    Text,
    Uuid,
    Integer,
    Boolean,
    Date,
    TimestampPair,
    Json,
    Decimal,
    Enum,
    ForeignKey,
    SoftDeletes,
    Identity,
    Morphs,
    Relationship,
}

macro_rules! column_types {
    ($($variant:ident => $name:literal, $family:ident;)*) => {
        /// Every column type an attribute may declare.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum ColumnType {
            $($variant,)*
        }

        impl ColumnType {
            pub const ALL: &'static [ColumnType] = &[$(ColumnType::$variant,)*];

            /// The spelling used in config files and in the schema builder call.
            pub fn as_str(self) -> &'static str {
                match self {
                    $(ColumnType::$variant => $name,)*
                }
            }

            pub fn family(self) -> Family {
                match self {
                    $(ColumnType::$variant => Family::$family,)*
                }
            }

            pub fn parse(s: &str) -> Option<ColumnType> {
                match s {
                    $($name => Some(ColumnType::$variant),)*
                    _ => None,
                }
            }
        }
    };
}

column_types! {
    String => "string", String;
    Char => "char", String;
    Text => "text", Text;
    MediumText => "mediumText", Text;
    LongText => "longText", Text;
    Uuid => "uuid", Uuid;
    Integer => "integer", Integer;
    TinyInteger => "tinyInteger", Integer;
    SmallInteger => "smallInteger", Integer;
    MediumInteger => "mediumInteger", Integer;
    BigInteger => "bigInteger", Integer;
    UnsignedInteger => "unsignedInteger", Integer;
    UnsignedBigInteger => "unsignedBigInteger", Integer;
    Boolean => "boolean", Boolean;
    Date => "date", Date;
    DateTime => "dateTime", Date;
    Time => "time", Date;
    Timestamp => "timestamp", Date;
    Year => "year", Date;
    Timestamps => "timestamps", TimestampPair;
    TimestampsTz => "timestampsTz", TimestampPair;
    NullableTimestamps => "nullableTimestamps", TimestampPair;
    Json => "json", Json;
    Jsonb => "jsonb", Json;
    Decimal => "decimal", Decimal;
    Double => "double", Decimal;
    Float => "float", Decimal;
    Enum => "enum", Enum;
    ForeignId => "foreignId", ForeignKey;
    Foreign => "foreign", ForeignKey;
    SoftDeletes => "softDeletes", SoftDeletes;
    SoftDeletesTz => "softDeletesTz", SoftDeletes;
    Id => "id", Identity;
    Increments => "increments", Identity;
    BigIncrements => "bigIncrements", Identity;
    Morphs => "morphs", Morphs;
    NullableMorphs => "nullableMorphs", Morphs;
    UuidMorphs => "uuidMorphs", Morphs;
    Relationship => "relationship", Relationship;
}

use Field::*;

const STRING_FIELDS: &[Field] = &[Length, Nullable, Unique, Default, After];
const TEXT_FIELDS: &[Field] = &[Nullable, After];
const SCALAR_FIELDS: &[Field] = &[Nullable, Unique, Default, After];
const BOOLEAN_FIELDS: &[Field] = &[Nullable, Default, After];
const DECIMAL_FIELDS: &[Field] = &[Total, Places, Nullable, Unique, Default, After];
const ENUM_FIELDS: &[Field] = &[Options, Nullable, Default, After];
const FOREIGN_FIELDS: &[Field] = &[Nullable, On, References, OnDelete, OnUpdate, After];
const RELATIONSHIP_FIELDS: &[Field] = &[Relationship];

impl ColumnType {
    /// Fields whitelisted for this type, beyond `name` and `type`.
    pub fn allowed_fields(self) -> &'static [Field] {
        match self.family() {
            Family::String => STRING_FIELDS,
            Family::Text | Family::Json => TEXT_FIELDS,
            Family::Uuid | Family::Integer => SCALAR_FIELDS,
            Family::Boolean | Family::Date => BOOLEAN_FIELDS,
            Family::Decimal => DECIMAL_FIELDS,
            Family::Enum => ENUM_FIELDS,
            Family::ForeignKey => FOREIGN_FIELDS,
            Family::TimestampPair | Family::SoftDeletes | Family::Identity | Family::Morphs => {
                &[]
            }
            Family::Relationship => RELATIONSHIP_FIELDS,
        }
    }

    pub fn allows(self, field: Field) -> bool {
        self.allowed_fields().contains(&field)
    }

    /// Fields that must be present, with the rule that requires them.
    pub fn required_fields(self) -> &'static [(Field, &'static str)] {
        match self {
            ColumnType::Enum => &[(Options, "enum columns need a non-empty option set")],
            ColumnType::Decimal | ColumnType::Double | ColumnType::Float => &[
                (Total, "floating point columns need a total digit count"),
                (Places, "floating point columns need a decimal place count"),
            ],
            ColumnType::Foreign => &[(On, "foreign constraints need a referenced table")],
            ColumnType::Relationship => {
                &[(Relationship, "relationship placeholders need a relationship definition")]
            }
            _ => &[],
        }
    }

    pub fn is_identity(self) -> bool {
        self.family() == Family::Identity
    }

    /// Types that produce the created/updated timestamp pair.
    pub fn is_timestamp_pair(self) -> bool {
        self.family() == Family::TimestampPair
    }

    /// Types whose columns the framework manages itself.
    pub fn is_timestamp_producing(self) -> bool {
        matches!(self.family(), Family::TimestampPair | Family::SoftDeletes)
    }

    /// `foreignId`, `foreign` and the polymorphic key pairs.
    pub fn is_foreign_key_producing(self) -> bool {
        matches!(self.family(), Family::ForeignKey | Family::Morphs)
    }

    pub fn is_placeholder(self) -> bool {
        self == ColumnType::Relationship
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
