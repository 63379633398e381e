use std::fmt;

/// A validated ISO-4217 currency code, always upper case.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CurrencyCode([u8; 3]);

impl CurrencyCode {
    pub const INR: CurrencyCode = CurrencyCode(*b"INR");

    /// Parses a three letter code, ignoring surrounding whitespace and case.
    pub fn parse(raw: &str) -> Option<CurrencyCode> {
        let bytes = raw.trim().as_bytes();
        if bytes.len() != 3 || !bytes.iter().all(u8::is_ascii_alphabetic) {
            return None;
        }
        Some(CurrencyCode([
            bytes[0].to_ascii_uppercase(),
            bytes[1].to_ascii_uppercase(),
            bytes[2].to_ascii_uppercase(),
        ]))
    }

    pub fn as_str(&self) -> &str {
        // Only ASCII letters are ever stored.
        std::str::from_utf8(&self.0).unwrap_or("INR")
    }
}

impl Default for CurrencyCode {
    fn default() -> Self {
        CurrencyCode::INR
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Currencies the server lets the user pick as display currency.
pub const SELECTABLE_CURRENCIES: [&str; 6] = ["INR", "USD", "EUR", "GBP", "JPY", "AUD"];

/// Digits after the decimal point, from the ISO-4217 minor unit column.
fn minor_units(code: CurrencyCode) -> u32 {
    match code.as_str() {
        "BIF" | "CLP" | "DJF" | "GNF" | "ISK" | "JPY" | "KMF" | "KRW" | "PYG" | "RWF"
        | "UGX" | "UYI" | "VND" | "VUV" | "XAF" | "XOF" | "XPF" => 0,
        "BHD" | "IQD" | "JOD" | "KWD" | "LYD" | "OMR" | "TND" => 3,
        "CLF" | "UYW" => 4,
        _ => 2,
    }
}

/// The locale the app shows each currency in. Codes without one use the
/// browser's default locale.
#[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
fn locale_for(code: CurrencyCode) -> Option<&'static str> {
    match code.as_str() {
        "INR" => Some("en-IN"),
        "USD" => Some("en-US"),
        "EUR" => Some("de-DE"),
        "GBP" => Some("en-GB"),
        "JPY" => Some("ja-JP"),
        "AUD" => Some("en-AU"),
        "PHP" => Some("en-PH"),
        _ => None,
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Grouping {
    /// 1,234,567
    Western,
    /// 12,34,567
    Indian,
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum SymbolPosition {
    Prefix,
    Suffix,
}

/// How amounts look in the locale associated with a currency. Used when
/// `Intl.NumberFormat` is not available.
#[derive(Clone, Debug, PartialEq)]
struct LocaleStyle {
    symbol: String,
    position: SymbolPosition,
    group_separator: char,
    decimal_separator: char,
    grouping: Grouping,
    fraction_digits: u32,
}

fn style_for(code: CurrencyCode) -> LocaleStyle {
    let western = |symbol: &str| LocaleStyle {
        symbol: symbol.to_string(),
        position: SymbolPosition::Prefix,
        group_separator: ',',
        decimal_separator: '.',
        grouping: Grouping::Western,
        fraction_digits: minor_units(code),
    };

    match code.as_str() {
        "INR" => LocaleStyle {
            grouping: Grouping::Indian,
            ..western("₹")
        },
        "USD" | "AUD" => western("$"),
        "GBP" => western("£"),
        "PHP" => western("₱"),
        "JPY" => western("￥"),
        "KRW" => western("₩"),
        "EUR" => LocaleStyle {
            symbol: "\u{a0}€".to_string(),
            position: SymbolPosition::Suffix,
            group_separator: '.',
            decimal_separator: ',',
            ..western("€")
        },
        other => western(&format!("{other}\u{a0}")),
    }
}

#[cfg(target_arch = "wasm32")]
fn intl_formatter(code: CurrencyCode) -> Option<js_sys::Intl::NumberFormat> {
    use wasm_bindgen::JsValue;

    let locales = match locale_for(code) {
        Some(locale) => js_sys::Array::of1(&JsValue::from_str(locale)),
        None => js_sys::Array::new(),
    };
    let options = js_sys::Object::new();
    js_sys::Reflect::set(&options, &"style".into(), &"currency".into()).ok()?;
    js_sys::Reflect::set(&options, &"currency".into(), &code.as_str().into()).ok()?;
    Some(js_sys::Intl::NumberFormat::new(&locales, &options))
}

/// Formats amounts for one currency in the locale the app associates with
/// it. In the browser this is `Intl.NumberFormat`; elsewhere a built-in
/// table for the same locales stands in.
#[derive(Clone)]
pub struct CurrencyFormatter {
    style: LocaleStyle,
    #[cfg(target_arch = "wasm32")]
    intl: Option<js_sys::Intl::NumberFormat>,
}

impl CurrencyFormatter {
    pub fn new(code: CurrencyCode) -> Self {
        Self {
            style: style_for(code),
            #[cfg(target_arch = "wasm32")]
            intl: intl_formatter(code),
        }
    }

    pub fn format(&self, amount: f64) -> String {
        #[cfg(target_arch = "wasm32")]
        let text = self.format_intl(amount);
        #[cfg(not(target_arch = "wasm32"))]
        let text: Option<String> = None;

        text.unwrap_or_else(|| self.format_fallback(amount))
    }

    #[cfg(target_arch = "wasm32")]
    fn format_intl(&self, amount: f64) -> Option<String> {
        let format = self.intl.as_ref()?.format();
        let value = wasm_bindgen::JsValue::from_f64(amount);
        match format.call1(&wasm_bindgen::JsValue::UNDEFINED, &value) {
            Ok(text) => text.as_string(),
            Err(err) => {
                log::warn!("Intl.NumberFormat failed for {amount}: {err:?}");
                None
            }
        }
    }

    fn format_fallback(&self, amount: f64) -> String {
        let scale = 10_i64.pow(self.style.fraction_digits);
        // Half away from zero at the minor unit.
        let minor = (amount.abs() * scale as f64).round() as i64;

        let whole = group_digits(
            minor / scale,
            self.style.grouping,
            self.style.group_separator,
        );
        let number = if self.style.fraction_digits > 0 {
            format!(
                "{}{}{:0width$}",
                whole,
                self.style.decimal_separator,
                minor % scale,
                width = self.style.fraction_digits as usize
            )
        } else {
            whole
        };

        // Negative values keep their sign even when they round to zero.
        let sign = if amount.is_sign_negative() && !amount.is_nan() { "-" } else { "" };
        match self.style.position {
            SymbolPosition::Prefix => format!("{}{}{}", sign, self.style.symbol, number),
            SymbolPosition::Suffix => format!("{}{}{}", sign, number, self.style.symbol),
        }
    }
}

fn group_digits(value: i64, grouping: Grouping, separator: char) -> String {
    let digits = value.to_string().chars().rev().collect::<Vec<char>>();
    let mut out = Vec::with_capacity(digits.len() + digits.len() / 2);
    for (i, ch) in digits.iter().enumerate() {
        let boundary = match grouping {
            Grouping::Western => i > 0 && i % 3 == 0,
            Grouping::Indian => i == 3 || (i > 3 && (i - 3) % 2 == 0),
        };
        if boundary {
            out.push(separator);
        }
        out.push(*ch);
    }
    out.into_iter().rev().collect()
}
