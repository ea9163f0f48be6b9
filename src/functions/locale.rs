//! Culture data for the locale-aware builtins.
//!
//! Only a handful of cultures are carried. A locale is matched by its full
//! name first, then by its language, and anything unknown formats with the
//! invariant culture.

use lazy_static::lazy_static;

#[derive(Debug, Clone, PartialEq)]
pub struct Locale {
    pub name: &'static str,
    pub months: [&'static str; 12],
    pub months_abbr: [&'static str; 12],
    /// Sunday first.
    pub days: [&'static str; 7],
    pub days_abbr: [&'static str; 7],
    pub am: &'static str,
    pub pm: &'static str,
    pub short_date: &'static str,
    pub long_date: &'static str,
    pub short_time: &'static str,
    pub long_time: &'static str,
    pub month_day: &'static str,
    pub year_month: &'static str,
    pub decimal_separator: &'static str,
    pub group_separator: &'static str,
}

const EN_MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];
const EN_MONTHS_ABBR: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];
const EN_DAYS: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];
const EN_DAYS_ABBR: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

lazy_static! {
    static ref INVARIANT: Locale = Locale {
        name: "",
        months: EN_MONTHS,
        months_abbr: EN_MONTHS_ABBR,
        days: EN_DAYS,
        days_abbr: EN_DAYS_ABBR,
        am: "AM",
        pm: "PM",
        short_date: "MM/dd/yyyy",
        long_date: "dddd, dd MMMM yyyy",
        short_time: "HH:mm",
        long_time: "HH:mm:ss",
        month_day: "MMMM dd",
        year_month: "yyyy MMMM",
        decimal_separator: ".",
        group_separator: ",",
    };
    static ref LOCALES: Vec<Locale> = vec![
        Locale {
            name: "en-US",
            short_date: "M/d/yyyy",
            long_date: "dddd, MMMM d, yyyy",
            short_time: "h:mm tt",
            long_time: "h:mm:ss tt",
            month_day: "MMMM d",
            year_month: "MMMM yyyy",
            ..INVARIANT.clone()
        },
        Locale {
            name: "en-GB",
            short_date: "dd/MM/yyyy",
            long_date: "dd MMMM yyyy",
            month_day: "d MMMM",
            year_month: "MMMM yyyy",
            am: "am",
            pm: "pm",
            ..INVARIANT.clone()
        },
        Locale {
            name: "fr-FR",
            months: [
                "janvier",
                "février",
                "mars",
                "avril",
                "mai",
                "juin",
                "juillet",
                "août",
                "septembre",
                "octobre",
                "novembre",
                "décembre",
            ],
            months_abbr: [
                "janv.", "févr.", "mars", "avr.", "mai", "juin", "juil.", "août", "sept.", "oct.",
                "nov.", "déc.",
            ],
            days: [
                "dimanche", "lundi", "mardi", "mercredi", "jeudi", "vendredi", "samedi",
            ],
            days_abbr: ["dim.", "lun.", "mar.", "mer.", "jeu.", "ven.", "sam."],
            am: "",
            pm: "",
            short_date: "dd/MM/yyyy",
            long_date: "dddd d MMMM yyyy",
            month_day: "d MMMM",
            year_month: "MMMM yyyy",
            decimal_separator: ",",
            group_separator: "\u{a0}",
            ..INVARIANT.clone()
        },
        Locale {
            name: "de-DE",
            months: [
                "Januar",
                "Februar",
                "März",
                "April",
                "Mai",
                "Juni",
                "Juli",
                "August",
                "September",
                "Oktober",
                "November",
                "Dezember",
            ],
            months_abbr: [
                "Jan", "Feb", "März", "Apr", "Mai", "Juni", "Juli", "Aug", "Sept", "Okt", "Nov",
                "Dez",
            ],
            days: [
                "Sonntag",
                "Montag",
                "Dienstag",
                "Mittwoch",
                "Donnerstag",
                "Freitag",
                "Samstag",
            ],
            days_abbr: ["So", "Mo", "Di", "Mi", "Do", "Fr", "Sa"],
            am: "",
            pm: "",
            short_date: "dd.MM.yyyy",
            long_date: "dddd, d. MMMM yyyy",
            month_day: "d. MMMM",
            year_month: "MMMM yyyy",
            decimal_separator: ",",
            group_separator: ".",
            ..INVARIANT.clone()
        },
        Locale {
            name: "es-ES",
            months: [
                "enero",
                "febrero",
                "marzo",
                "abril",
                "mayo",
                "junio",
                "julio",
                "agosto",
                "septiembre",
                "octubre",
                "noviembre",
                "diciembre",
            ],
            months_abbr: [
                "ene", "feb", "mar", "abr", "may", "jun", "jul", "ago", "sept", "oct", "nov",
                "dic",
            ],
            days: [
                "domingo",
                "lunes",
                "martes",
                "miércoles",
                "jueves",
                "viernes",
                "sábado",
            ],
            days_abbr: ["dom", "lun", "mar", "mié", "jue", "vie", "sáb"],
            am: "a. m.",
            pm: "p. m.",
            short_date: "d/M/yyyy",
            long_date: "dddd, d 'de' MMMM 'de' yyyy",
            short_time: "H:mm",
            long_time: "H:mm:ss",
            month_day: "d 'de' MMMM",
            year_month: "MMMM 'de' yyyy",
            decimal_separator: ",",
            group_separator: ".",
            ..INVARIANT.clone()
        },
    ];
}

pub fn invariant() -> &'static Locale {
    &INVARIANT
}

/// Resolves a culture name such as `fr-FR` or `fr`.
pub fn lookup(name: Option<&str>) -> &'static Locale {
    let Some(name) = name.filter(|n| !n.is_empty()) else {
        return invariant();
    };
    if let Some(locale) = LOCALES.iter().find(|l| l.name.eq_ignore_ascii_case(name)) {
        return locale;
    }
    let language = name.split(['-', '_']).next().unwrap_or_default();
    match LOCALES.iter().find(|l| {
        l.name
            .split('-')
            .next()
            .is_some_and(|lang| lang.eq_ignore_ascii_case(language))
    }) {
        Some(locale) => locale,
        None => {
            tracing::debug!("unknown locale {}, using invariant culture", name);
            invariant()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_falls_back_by_language() {
        assert_eq!(lookup(Some("fr-CA")).name, "fr-FR");
        assert_eq!(lookup(Some("EN-gb")).name, "en-GB");
        assert_eq!(lookup(Some("xx-YY")).name, "");
        assert_eq!(lookup(None).long_date, "dddd, dd MMMM yyyy");
    }
}
