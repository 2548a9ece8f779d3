//! The numeric tower
//!
//! Numbers ladder through native integer → rational → real → complex, with
//! promotion ("raise") applied until both operands of an arithmetic or
//! comparison operation share a representation, and demotion
//! ("lower-if-exact") normalizing results back down when no information is
//! lost. Native-integer arithmetic is checked; overflow promotes to real.

use std::cmp::Ordering;
use std::fmt;

use super::error::EvalError;

/// An exact ratio of two native integers, kept normalized: positive
/// denominator, lowest terms.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rational {
    numer: i64,
    denom: i64,
}

fn gcd(a: i64, b: i64) -> i64 {
    let (mut a, mut b) = (a.abs(), b.abs());
    while b != 0 {
        let r = a % b;
        a = b;
        b = r;
    }
    a.max(1)
}

impl Rational {
    /// `None` when the denominator is zero; callers map that onto the
    /// infinity/NaN sentinels.
    pub fn new(numer: i64, denom: i64) -> Option<Self> {
        if denom == 0 {
            return None;
        }
        let sign = if denom < 0 { -1 } else { 1 };
        let divisor = gcd(numer, denom);
        Some(Self {
            numer: sign * (numer / divisor),
            denom: (denom / divisor).abs(),
        })
    }

    pub fn numer(&self) -> i64 {
        self.numer
    }

    pub fn denom(&self) -> i64 {
        self.denom
    }

    pub fn is_integral(&self) -> bool {
        self.denom == 1
    }

    fn to_f64(self) -> f64 {
        self.numer as f64 / self.denom as f64
    }
}

impl fmt::Display for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.numer, self.denom)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Complex {
    pub re: f64,
    pub im: f64,
}

impl Complex {
    pub fn new(re: f64, im: f64) -> Self {
        Self { re, im }
    }
}

impl fmt::Display for Complex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.im < 0.0 {
            write!(f, "{}-{}i", self.re, -self.im)
        } else {
            write!(f, "{}+{}i", self.re, self.im)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Int(i64),
    Rational(Rational),
    Real(f64),
    Complex(Complex),
}

impl Number {
    pub const ZERO: Number = Number::Int(0);

    fn tier(&self) -> u8 {
        match self {
            Number::Int(_) => 0,
            Number::Rational(_) => 1,
            Number::Real(_) => 2,
            Number::Complex(_) => 3,
        }
    }

    /// Promote one step up the ladder.
    fn raise(self) -> Number {
        match self {
            Number::Int(value) => match Rational::new(value, 1) {
                Some(rational) => Number::Rational(rational),
                None => Number::Real(value as f64),
            },
            Number::Rational(rational) => Number::Real(rational.to_f64()),
            Number::Real(value) => Number::Complex(Complex::new(value, 0.0)),
            Number::Complex(_) => self,
        }
    }

    fn raise_to(self, tier: u8) -> Number {
        let mut number = self;
        while number.tier() < tier {
            number = number.raise();
        }
        number
    }

    fn raise_to_same(lhs: Number, rhs: Number) -> (Number, Number) {
        let tier = lhs.tier().max(rhs.tier());
        (lhs.raise_to(tier), rhs.raise_to(tier))
    }

    /// Demote when no information is lost: an integral rational becomes an
    /// integer, a zero-imaginary complex becomes a real.
    pub fn lower_if_exact(self) -> Number {
        match self {
            Number::Rational(rational) if rational.is_integral() => Number::Int(rational.numer()),
            Number::Complex(complex) if complex.im == 0.0 => Number::Real(complex.re),
            other => other,
        }
    }

    /// Demote a real to an exact representation (rational, then integer);
    /// non-finite reals stay inexact.
    pub fn exact(self) -> Number {
        match self {
            Number::Int(_) | Number::Rational(_) => self.lower_if_exact(),
            Number::Real(value) => {
                if !value.is_finite() {
                    return self;
                }
                if value == value.trunc() && value.abs() < i64::MAX as f64 {
                    return Number::Int(value as i64);
                }
                // Walk the value into a denominator power of ten.
                let mut denom: i64 = 1;
                let mut scaled = value;
                while scaled != scaled.trunc() && denom < 1_000_000_000_000_000 {
                    scaled *= 10.0;
                    denom *= 10;
                }
                match Rational::new(scaled as i64, denom) {
                    Some(rational) => Number::Rational(rational).lower_if_exact(),
                    None => self,
                }
            }
            Number::Complex(complex) if complex.im == 0.0 => Number::Real(complex.re).exact(),
            other => other,
        }
    }

    /// Promote to an inexact (real) representation.
    pub fn inexact(self) -> Number {
        match self {
            Number::Complex(_) => self,
            other => other.raise_to(2),
        }
    }

    pub fn is_exact(&self) -> bool {
        matches!(self, Number::Int(_) | Number::Rational(_))
    }

    pub fn is_integer(&self) -> bool {
        match self {
            Number::Int(_) => true,
            Number::Rational(rational) => rational.is_integral(),
            Number::Real(value) => value.is_finite() && *value == value.trunc(),
            Number::Complex(complex) => {
                complex.im == 0.0 && complex.re.is_finite() && complex.re == complex.re.trunc()
            }
        }
    }

    pub fn is_zero(&self) -> bool {
        matches!(self.partial_cmp_number(&Number::ZERO), Some(Ordering::Equal))
    }

    pub fn is_finite(&self) -> bool {
        match self {
            Number::Int(_) | Number::Rational(_) => true,
            Number::Real(value) => value.is_finite(),
            Number::Complex(complex) => complex.re.is_finite() && complex.im.is_finite(),
        }
    }

    pub fn is_nan(&self) -> bool {
        match self {
            Number::Int(_) | Number::Rational(_) => false,
            Number::Real(value) => value.is_nan(),
            Number::Complex(complex) => complex.re.is_nan() || complex.im.is_nan(),
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Number::Int(value) => Some(*value),
            Number::Rational(rational) if rational.is_integral() => Some(rational.numer()),
            Number::Real(value) if value.is_finite() && *value == value.trunc() => {
                Some(*value as i64)
            }
            _ => None,
        }
    }

    fn as_f64(&self) -> Option<f64> {
        match self {
            Number::Int(value) => Some(*value as f64),
            Number::Rational(rational) => Some(rational.to_f64()),
            Number::Real(value) => Some(*value),
            Number::Complex(_) => None,
        }
    }

    pub fn add(lhs: Number, rhs: Number) -> Result<Number, EvalError> {
        let (lhs, rhs) = Number::raise_to_same(lhs, rhs);
        let result = match (lhs, rhs) {
            (Number::Int(a), Number::Int(b)) => match a.checked_add(b) {
                Some(sum) => Number::Int(sum),
                None => Number::Real(a as f64 + b as f64),
            },
            (Number::Rational(a), Number::Rational(b)) => {
                rational_op(
                    a,
                    b,
                    |an, ad, bn, bd| {
                        Some((
                            an.checked_mul(bd)?.checked_add(bn.checked_mul(ad)?)?,
                            ad.checked_mul(bd)?,
                        ))
                    },
                    |x, y| x + y,
                )
            }
            (Number::Real(a), Number::Real(b)) => Number::Real(a + b),
            (Number::Complex(a), Number::Complex(b)) => {
                Number::Complex(Complex::new(a.re + b.re, a.im + b.im))
            }
            _ => return Err(EvalError::numeric("mismatched numeric promotion")),
        };
        Ok(result)
    }

    pub fn sub(lhs: Number, rhs: Number) -> Result<Number, EvalError> {
        let (lhs, rhs) = Number::raise_to_same(lhs, rhs);
        let result = match (lhs, rhs) {
            (Number::Int(a), Number::Int(b)) => match a.checked_sub(b) {
                Some(diff) => Number::Int(diff),
                None => Number::Real(a as f64 - b as f64),
            },
            (Number::Rational(a), Number::Rational(b)) => {
                rational_op(
                    a,
                    b,
                    |an, ad, bn, bd| {
                        Some((
                            an.checked_mul(bd)?.checked_sub(bn.checked_mul(ad)?)?,
                            ad.checked_mul(bd)?,
                        ))
                    },
                    |x, y| x - y,
                )
            }
            (Number::Real(a), Number::Real(b)) => Number::Real(a - b),
            (Number::Complex(a), Number::Complex(b)) => {
                Number::Complex(Complex::new(a.re - b.re, a.im - b.im))
            }
            _ => return Err(EvalError::numeric("mismatched numeric promotion")),
        };
        Ok(result)
    }

    pub fn mul(lhs: Number, rhs: Number) -> Result<Number, EvalError> {
        let (lhs, rhs) = Number::raise_to_same(lhs, rhs);
        let result = match (lhs, rhs) {
            (Number::Int(a), Number::Int(b)) => match a.checked_mul(b) {
                Some(product) => Number::Int(product),
                None => Number::Real(a as f64 * b as f64),
            },
            (Number::Rational(a), Number::Rational(b)) => {
                rational_op(
                    a,
                    b,
                    |an, ad, bn, bd| Some((an.checked_mul(bn)?, ad.checked_mul(bd)?)),
                    |x, y| x * y,
                )
            }
            (Number::Real(a), Number::Real(b)) => Number::Real(a * b),
            (Number::Complex(a), Number::Complex(b)) => Number::Complex(Complex::new(
                a.re * b.re - a.im * b.im,
                a.re * b.im + a.im * b.re,
            )),
            _ => return Err(EvalError::numeric("mismatched numeric promotion")),
        };
        Ok(result)
    }

    pub fn div(lhs: Number, rhs: Number) -> Result<Number, EvalError> {
        let (lhs, rhs) = Number::raise_to_same(lhs, rhs);
        let result = match (lhs, rhs) {
            // Exact division stays exact: an even quotient is an integer,
            // anything else a rational; zero denominators follow the
            // rational-literal sentinels.
            (Number::Int(a), Number::Int(b)) => {
                if b == 0 {
                    zero_denominator(a)
                } else if a % b == 0 {
                    Number::Int(a / b)
                } else {
                    match Rational::new(a, b) {
                        Some(rational) => Number::Rational(rational),
                        None => zero_denominator(a),
                    }
                }
            }
            (Number::Rational(a), Number::Rational(b)) => {
                if b.numer() == 0 {
                    zero_denominator(a.numer())
                } else {
                    rational_op(
                        a,
                        b,
                        |an, ad, bn, bd| Some((an.checked_mul(bd)?, ad.checked_mul(bn)?)),
                        |x, y| x / y,
                    )
                }
            }
            (Number::Real(a), Number::Real(b)) => Number::Real(a / b),
            (Number::Complex(a), Number::Complex(b)) => {
                let norm = b.re * b.re + b.im * b.im;
                Number::Complex(Complex::new(
                    (a.re * b.re + a.im * b.im) / norm,
                    (a.im * b.re - a.re * b.im) / norm,
                ))
            }
            _ => return Err(EvalError::numeric("mismatched numeric promotion")),
        };
        Ok(result.lower_if_exact())
    }

    pub fn rem(lhs: Number, rhs: Number) -> Result<Number, EvalError> {
        match (lhs.as_i64(), rhs.as_i64()) {
            (Some(a), Some(b)) if b != 0 => Ok(Number::Int(a % b)),
            _ => match (lhs.as_f64(), rhs.as_f64()) {
                (Some(a), Some(b)) => Ok(Number::Real(a % b)),
                _ => Err(EvalError::numeric("cannot take remainder of complex values")),
            },
        }
    }

    pub fn pow(lhs: Number, rhs: Number) -> Result<Number, EvalError> {
        if let (Some(base), Some(exp)) = (lhs.as_i64(), rhs.as_i64()) {
            if (0..=u32::MAX as i64).contains(&exp) {
                if let Some(power) = base.checked_pow(exp as u32) {
                    return Ok(Number::Int(power));
                }
            }
        }
        match (lhs.as_f64(), rhs.as_f64()) {
            (Some(a), Some(b)) => Ok(Number::Real(a.powf(b))),
            _ => Err(EvalError::numeric("cannot exponentiate complex values")),
        }
    }

    pub fn negate(self) -> Number {
        match self {
            Number::Int(value) => match value.checked_neg() {
                Some(negated) => Number::Int(negated),
                None => Number::Real(-(value as f64)),
            },
            Number::Rational(rational) => Rational::new(-rational.numer(), rational.denom())
                .map(Number::Rational)
                .unwrap_or(Number::ZERO),
            Number::Real(value) => Number::Real(-value),
            Number::Complex(complex) => Number::Complex(Complex::new(-complex.re, -complex.im)),
        }
    }

    pub fn abs(self) -> Number {
        match self {
            Number::Complex(complex) => Number::Real(complex.re.hypot(complex.im)),
            other => match other.partial_cmp_number(&Number::ZERO) {
                Some(Ordering::Less) => other.negate(),
                _ => other,
            },
        }
    }

    /// Numeric ordering under promotion; complex values do not order.
    pub fn partial_cmp_number(&self, other: &Number) -> Option<Ordering> {
        let (lhs, rhs) = Number::raise_to_same(*self, *other);
        match (lhs, rhs) {
            (Number::Int(a), Number::Int(b)) => Some(a.cmp(&b)),
            (Number::Rational(a), Number::Rational(b)) => {
                // Compare via cross-multiplication in wide arithmetic.
                let left = a.numer() as i128 * b.denom() as i128;
                let right = b.numer() as i128 * a.denom() as i128;
                Some(left.cmp(&right))
            }
            (Number::Real(a), Number::Real(b)) => a.partial_cmp(&b),
            _ => None,
        }
    }

    pub fn equals(&self, other: &Number) -> bool {
        let (lhs, rhs) = Number::raise_to_same(*self, *other);
        match (lhs, rhs) {
            (Number::Complex(a), Number::Complex(b)) => a == b,
            _ => matches!(self.partial_cmp_number(other), Some(Ordering::Equal)),
        }
    }

    pub fn floor(self) -> Result<Number, EvalError> {
        self.rounded(f64::floor, |r| {
            Number::Int(r.numer().div_euclid(r.denom()))
        })
    }

    pub fn ceiling(self) -> Result<Number, EvalError> {
        self.rounded(f64::ceil, |r| {
            Number::Int(-(-r.numer()).div_euclid(r.denom()))
        })
    }

    pub fn truncate(self) -> Result<Number, EvalError> {
        self.rounded(f64::trunc, |r| Number::Int(r.numer() / r.denom()))
    }

    pub fn round(self) -> Result<Number, EvalError> {
        self.rounded(f64::round, |r| {
            Number::Int((r.to_f64()).round() as i64)
        })
    }

    fn rounded(
        self,
        real_op: impl Fn(f64) -> f64,
        rational_op: impl Fn(&Rational) -> Number,
    ) -> Result<Number, EvalError> {
        match self {
            Number::Int(_) => Ok(self),
            Number::Rational(rational) => Ok(rational_op(&rational)),
            Number::Real(value) => Ok(Number::Real(real_op(value))),
            Number::Complex(_) => Err(EvalError::numeric("cannot round a complex value")),
        }
    }

    pub fn sqrt(self) -> Result<Number, EvalError> {
        match self.as_f64() {
            Some(value) if value >= 0.0 => Ok(Number::Real(value.sqrt())),
            Some(value) => Ok(Number::Complex(Complex::new(0.0, (-value).sqrt()))),
            None => Err(EvalError::numeric("cannot take sqrt of a complex value")),
        }
    }

    pub fn real_fn(self, f: impl Fn(f64) -> f64, name: &str) -> Result<Number, EvalError> {
        match self.as_f64() {
            Some(value) => Ok(Number::Real(f(value))),
            None => Err(EvalError::numeric(format!(
                "cannot take {name} of a complex value"
            ))),
        }
    }

    pub fn numerator(self) -> Result<Number, EvalError> {
        match self.exact() {
            Number::Int(value) => Ok(Number::Int(value)),
            Number::Rational(rational) => Ok(Number::Int(rational.numer())),
            _ => Err(EvalError::numeric("value has no exact numerator")),
        }
    }

    pub fn denominator(self) -> Result<Number, EvalError> {
        match self.exact() {
            Number::Int(_) => Ok(Number::Int(1)),
            Number::Rational(rational) => Ok(Number::Int(rational.denom())),
            _ => Err(EvalError::numeric("value has no exact denominator")),
        }
    }

    pub fn real_part(self) -> Number {
        match self {
            Number::Complex(complex) => Number::Real(complex.re),
            other => other,
        }
    }

    pub fn imag_part(self) -> Number {
        match self {
            Number::Complex(complex) => Number::Real(complex.im),
            _ => Number::ZERO,
        }
    }

    pub fn magnitude(self) -> Number {
        self.abs()
    }

    pub fn make_rectangular(re: Number, im: Number) -> Result<Number, EvalError> {
        match (re.as_f64(), im.as_f64()) {
            (Some(re), Some(im)) => Ok(Number::Complex(Complex::new(re, im)).lower_if_exact()),
            _ => Err(EvalError::numeric("components must be real")),
        }
    }

    // === Literal parsers, one per lexical subtype ===

    /// Decimal: a radix point or exponent makes it a real, otherwise a
    /// native integer (overflowing literals fall back to real).
    pub fn parse_decimal(text: &str) -> Result<Number, EvalError> {
        let text = text.trim();
        if text.contains('.') || text.contains('e') || text.contains('E') {
            return text
                .parse::<f64>()
                .map(Number::Real)
                .map_err(|_| EvalError::bad_literal("decimal", text));
        }
        match text.parse::<i64>() {
            Ok(value) => Ok(Number::Int(value)),
            Err(_) => text
                .parse::<f64>()
                .map(Number::Real)
                .map_err(|_| EvalError::bad_literal("decimal", text)),
        }
    }

    /// Binary: bits after the `0b` prefix, accumulated least significant
    /// bit first from the right.
    pub fn parse_binary(text: &str) -> Result<Number, EvalError> {
        let digits = text
            .trim()
            .strip_prefix("0b")
            .or_else(|| text.trim().strip_prefix("0B"))
            .ok_or_else(|| EvalError::bad_literal("binary", text))?;
        let mut value: i64 = 0;
        let mut overflowed = false;
        for (index, bit) in digits.chars().rev().enumerate() {
            let bit = match bit {
                '0' => 0i64,
                '1' => 1,
                _ => return Err(EvalError::bad_literal("binary", text)),
            };
            if bit == 1 {
                match 1i64.checked_shl(index as u32) {
                    Some(place) if index < 63 => match value.checked_add(place) {
                        Some(sum) => value = sum,
                        None => overflowed = true,
                    },
                    _ => overflowed = true,
                }
            }
        }
        if overflowed {
            let real = digits
                .chars()
                .rev()
                .enumerate()
                .map(|(index, bit)| if bit == '1' { (index as f64).exp2() } else { 0.0 })
                .sum();
            return Ok(Number::Real(real));
        }
        Ok(Number::Int(value))
    }

    /// Hex: standard radix-16 parse after the `0x` prefix.
    pub fn parse_hex(text: &str) -> Result<Number, EvalError> {
        let digits = text
            .trim()
            .strip_prefix("0x")
            .or_else(|| text.trim().strip_prefix("0X"))
            .ok_or_else(|| EvalError::bad_literal("hex", text))?;
        match i64::from_str_radix(digits, 16) {
            Ok(value) => Ok(Number::Int(value)),
            Err(_) => u128::from_str_radix(digits, 16)
                .map(|wide| Number::Real(wide as f64))
                .map_err(|_| EvalError::bad_literal("hex", text)),
        }
    }

    /// Rational: `numerator/denominator`. `0/0` is NaN; a zero denominator
    /// otherwise yields infinity signed by the numerator; exact results are
    /// lowered to an integer when integral.
    pub fn parse_rational(text: &str) -> Result<Number, EvalError> {
        let mut parts = text.splitn(2, '/');
        let numer = parts
            .next()
            .and_then(|part| part.trim().parse::<i64>().ok())
            .ok_or_else(|| EvalError::bad_literal("rational", text))?;
        let denom = parts
            .next()
            .and_then(|part| part.trim().parse::<i64>().ok())
            .ok_or_else(|| EvalError::bad_literal("rational", text))?;
        if numer == 0 && denom == 0 {
            return Ok(Number::Real(f64::NAN));
        }
        if numer == 0 {
            return Ok(Number::ZERO);
        }
        match Rational::new(numer, denom) {
            Some(rational) => Ok(Number::Rational(rational).lower_if_exact()),
            None => Ok(zero_denominator(numer)),
        }
    }

    /// Complex: `<real>±<imag>i`, both components decimal reals.
    pub fn parse_complex(text: &str) -> Result<Number, EvalError> {
        let body = text
            .trim()
            .strip_suffix('i')
            .ok_or_else(|| EvalError::bad_literal("complex", text))?;
        // Split at the last sign that is neither leading nor part of an
        // exponent.
        let bytes = body.as_bytes();
        let split = (1..bytes.len())
            .rev()
            .find(|&i| {
                (bytes[i] == b'+' || bytes[i] == b'-')
                    && bytes[i - 1] != b'e'
                    && bytes[i - 1] != b'E'
            })
            .ok_or_else(|| EvalError::bad_literal("complex", text))?;
        let re = body[..split]
            .trim()
            .parse::<f64>()
            .map_err(|_| EvalError::bad_literal("complex", text))?;
        let sign = if bytes[split] == b'-' { -1.0 } else { 1.0 };
        let im = body[split + 1..]
            .trim()
            .parse::<f64>()
            .map_err(|_| EvalError::bad_literal("complex", text))?;
        Ok(Number::Complex(Complex::new(re, sign * im)))
    }
}

/// The rational-literal sentinel for a zero denominator: infinity signed by
/// the numerator.
fn zero_denominator(numer: i64) -> Number {
    Number::Real(if numer < 0 {
        f64::NEG_INFINITY
    } else {
        f64::INFINITY
    })
}

/// Combine two rationals through a numerator/denominator computation in
/// checked arithmetic; overflow promotes the operation to reals.
fn rational_op(
    a: Rational,
    b: Rational,
    op: impl Fn(i64, i64, i64, i64) -> Option<(i64, i64)>,
    real_fallback: impl Fn(f64, f64) -> f64,
) -> Number {
    match op(a.numer(), a.denom(), b.numer(), b.denom()) {
        Some((numer, denom)) => match Rational::new(numer, denom) {
            Some(rational) => Number::Rational(rational).lower_if_exact(),
            None => zero_denominator(numer),
        },
        None => Number::Real(real_fallback(a.to_f64(), b.to_f64())),
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Int(value) => write!(f, "{value}"),
            Number::Rational(rational) => write!(f, "{rational}"),
            Number::Real(value) => write!(f, "{value}"),
            Number::Complex(complex) => write!(f, "{complex}"),
        }
    }
}
