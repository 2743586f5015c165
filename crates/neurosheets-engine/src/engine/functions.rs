//! Accumulation for the range functions (SUM, AVERAGE, COUNT, MAX, MIN).
//!
//! All five functions walk their arguments the same way, so one accumulator
//! collects everything and [`Accumulator::finish`] picks the result.

use super::ast::Function;

#[derive(Clone, Debug, Default)]
pub struct Accumulator {
    sum: f64,
    numeric: usize,
    non_empty: usize,
    max: Option<f64>,
    min: Option<f64>,
}

impl Accumulator {
    /// Record a numeric-coercible value.
    pub fn push_number(&mut self, n: f64) {
        self.sum += n;
        self.numeric += 1;
        self.non_empty += 1;
        self.max = Some(self.max.map_or(n, |m| m.max(n)));
        self.min = Some(self.min.map_or(n, |m| m.min(n)));
    }

    /// Record a non-empty value that is not a number.
    pub fn push_text(&mut self) {
        self.non_empty += 1;
    }

    /// Final value for a function. Functions with nothing numeric to work
    /// on (AVERAGE, MAX, MIN) yield 0.
    pub fn finish(&self, function: Function) -> f64 {
        match function {
            Function::Sum => self.sum,
            Function::Average => {
                if self.numeric > 0 {
                    self.sum / self.numeric as f64
                } else {
                    0.0
                }
            }
            Function::Count => self.non_empty as f64,
            Function::Max => self.max.unwrap_or(0.0),
            Function::Min => self.min.unwrap_or(0.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_accumulator_defaults_to_zero() {
        let acc = Accumulator::default();
        for function in [
            Function::Sum,
            Function::Average,
            Function::Count,
            Function::Max,
            Function::Min,
        ] {
            assert_eq!(acc.finish(function), 0.0);
        }
    }

    #[test]
    fn test_text_counts_but_does_not_average() {
        let mut acc = Accumulator::default();
        acc.push_number(4.0);
        acc.push_text();
        acc.push_number(-2.0);
        assert_eq!(acc.finish(Function::Sum), 2.0);
        assert_eq!(acc.finish(Function::Average), 1.0);
        assert_eq!(acc.finish(Function::Count), 3.0);
        assert_eq!(acc.finish(Function::Max), 4.0);
        assert_eq!(acc.finish(Function::Min), -2.0);
    }
}
