use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

/// Names of the builtin expression types.
///
/// The string form is what appears in expression text and in
/// [`ExpressionEvaluator::expr_type`](super::ExpressionEvaluator::expr_type).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, Display, AsRefStr, EnumIter)]
#[strum(serialize_all = "camelCase")]
pub enum ExpressionType {
    // math
    #[strum(serialize = "+")]
    Add,
    #[strum(serialize = "-")]
    Subtract,
    #[strum(serialize = "*")]
    Multiply,
    #[strum(serialize = "/")]
    Divide,
    #[strum(serialize = "^")]
    Power,
    #[strum(serialize = "%")]
    Mod,
    Min,
    Max,
    Average,
    Sum,
    Range,
    Floor,
    Ceiling,
    Round,
    Abs,
    Sqrt,

    // comparison
    #[strum(serialize = "==")]
    Equal,
    #[strum(serialize = "!=")]
    NotEqual,
    #[strum(serialize = "<")]
    LessThan,
    #[strum(serialize = "<=")]
    LessThanOrEqual,
    #[strum(serialize = ">")]
    GreaterThan,
    #[strum(serialize = ">=")]
    GreaterThanOrEqual,
    Exists,
    Contains,
    Empty,

    // logic
    #[strum(serialize = "&&")]
    And,
    #[strum(serialize = "||")]
    Or,
    #[strum(serialize = "!")]
    Not,
    If,
    Bool,
    Optional,
    Ignore,

    // string
    Concat,
    Length,
    Replace,
    ReplaceIgnoreCase,
    Split,
    Substring,
    ToLower,
    ToUpper,
    Trim,
    StartsWith,
    EndsWith,
    CountWord,
    AddOrdinal,
    NewGuid,
    IndexOf,
    LastIndexOf,
    #[strum(serialize = "EOL")]
    Eol,
    SentenceCase,
    TitleCase,
    StringOrValue,

    // collection
    Count,
    First,
    Last,
    Join,
    Foreach,
    Select,
    Where,
    Union,
    Intersection,
    Skip,
    Take,
    SubArray,
    SortBy,
    SortByDescending,
    IndicesAndValues,
    Flatten,
    Unique,
    Reverse,
    Any,
    All,
    CreateArray,

    // datetime
    AddDays,
    AddHours,
    AddMinutes,
    AddSeconds,
    DayOfMonth,
    DayOfWeek,
    DayOfYear,
    Month,
    Date,
    Year,
    UtcNow,
    FormatDateTime,
    FormatEpoch,
    FormatTicks,
    SubtractFromTime,
    DateReadBack,
    GetTimeOfDay,
    GetFutureTime,
    GetPastTime,
    #[strum(serialize = "convertFromUTC")]
    ConvertFromUtc,
    #[strum(serialize = "convertToUTC")]
    ConvertToUtc,
    AddToTime,
    StartOfDay,
    StartOfHour,
    StartOfMonth,
    Ticks,
    TicksToDays,
    TicksToHours,
    TicksToMinutes,
    DateTimeDiff,

    // conversion
    Float,
    Int,
    String,
    Binary,
    #[strum(serialize = "base64")]
    Base64,
    #[strum(serialize = "base64ToBinary")]
    Base64ToBinary,
    #[strum(serialize = "base64ToString")]
    Base64ToString,
    DataUri,
    DataUriToBinary,
    DataUriToString,
    UriComponent,
    UriComponentToString,
    JsonStringify,
    FormatNumber,
    Array,

    // uri
    UriHost,
    UriPath,
    UriPathAndQuery,
    UriPort,
    UriQuery,
    UriScheme,

    // object
    Json,
    GetProperty,
    AddProperty,
    SetProperty,
    RemoveProperty,
    Coalesce,
    Merge,
    #[strum(serialize = "jPath")]
    JPath,

    // memory
    #[strum(serialize = "Accessor")]
    Accessor,
    #[strum(serialize = "Element")]
    Element,
    SetPathToValue,

    // type checks
    IsInteger,
    IsFloat,
    IsString,
    IsArray,
    IsObject,
    IsBoolean,
    IsDateTime,

    // misc
    Rand,
    IsMatch,

    #[strum(serialize = "Constant")]
    Constant,
    #[strum(serialize = "Lambda")]
    Lambda,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_names() {
        assert_eq!(ExpressionType::Add.as_ref(), "+");
        assert_eq!(ExpressionType::ReplaceIgnoreCase.as_ref(), "replaceIgnoreCase");
        assert_eq!(ExpressionType::ConvertFromUtc.as_ref(), "convertFromUTC");
        assert_eq!(ExpressionType::Eol.to_string(), "EOL");
        assert_eq!(ExpressionType::IsDateTime.as_ref(), "isDateTime");
        assert_eq!(
            ExpressionType::from_str("dataUriToString").unwrap(),
            ExpressionType::DataUriToString
        );
    }
}
