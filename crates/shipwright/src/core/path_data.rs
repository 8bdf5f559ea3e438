//! Tokenizers for SVG path data, point lists and transform lists
//!
//! All three grammars share the SVG number rules: optional sign, optional
//! fraction, optional exponent, and no separator required between numbers
//! when the next one starts with a sign or a second decimal point
//! (`10-5`, `1.5.5`).

use chumsky::prelude::*;

use super::{EditorError, EditorResult, Point};

const PATH_COMMANDS: &str = "MmLlHhVvCcSsQqTtAaZz";

#[derive(Debug, Clone, Copy, PartialEq)]
enum PathToken {
    Command(char),
    Number(f64),
}

fn number<'src>() -> impl Parser<'src, &'src str, f64> + Clone {
    let digits = one_of("0123456789").repeated().at_least(1);
    let mantissa = digits
        .clone()
        .then(just('.').then(one_of("0123456789").repeated()).or_not())
        .ignored()
        .or(just('.').then(digits.clone()).ignored());
    let exponent = one_of("eE").then(one_of("+-").or_not()).then(digits);

    one_of("+-")
        .or_not()
        .then(mantissa)
        .then(exponent.or_not())
        .to_slice()
        .map(|s: &str| s.parse::<f64>().unwrap_or(0.0))
}

fn separators<'src>() -> impl Parser<'src, &'src str, ()> + Clone {
    one_of(" \t\r\n,").repeated().ignored()
}

fn number_list<'src>() -> impl Parser<'src, &'src str, Vec<f64>> {
    separators()
        .ignore_then(number().then_ignore(separators()).repeated().collect::<Vec<_>>())
        .then_ignore(end())
}

fn path_tokens<'src>() -> impl Parser<'src, &'src str, Vec<PathToken>> {
    let token = one_of(PATH_COMMANDS)
        .map(PathToken::Command)
        .or(number().map(PathToken::Number));

    separators()
        .ignore_then(token.then_ignore(separators()).repeated().collect::<Vec<_>>())
        .then_ignore(end())
}

fn transform_functions<'src>() -> impl Parser<'src, &'src str, Vec<TransformFunction>> {
    let name = any()
        .filter(|c: &char| c.is_ascii_alphabetic())
        .repeated()
        .at_least(1)
        .to_slice()
        .map(|s: &str| s.to_string());
    let args = number()
        .then_ignore(separators())
        .repeated()
        .collect::<Vec<_>>()
        .delimited_by(just('(').then(separators()), just(')'));
    let function = name
        .then_ignore(separators())
        .then(args)
        .map(|(name, args)| TransformFunction { name, args });

    separators()
        .ignore_then(function.then_ignore(separators()).repeated().collect::<Vec<_>>())
        .then_ignore(end())
}

/// Parse a whitespace/comma separated list of numbers
pub fn parse_numbers(input: &str) -> EditorResult<Vec<f64>> {
    number_list()
        .parse(input)
        .into_result()
        .map_err(|errors| EditorError::path_data_error(format!("{:?}", errors), input))
}

/// Parse a polygon `points` attribute into coordinate pairs
///
/// A trailing odd coordinate is dropped.
pub fn parse_points(input: &str) -> EditorResult<Vec<Point>> {
    let numbers = parse_numbers(input)?;
    Ok(numbers
        .chunks_exact(2)
        .map(|pair| Point::new(pair[0], pair[1]))
        .collect())
}

/// One drawing command with its arguments
#[derive(Debug, Clone, PartialEq)]
pub struct PathCommand {
    pub letter: char,
    pub args: Vec<f64>,
}

impl PathCommand {
    fn is_relative(&self) -> bool {
        self.letter.is_ascii_lowercase()
    }
}

/// Parsed `d` attribute of a path element
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PathData {
    pub commands: Vec<PathCommand>,
}

impl PathData {
    /// Parse path data; numbers before the first command are read as a move
    pub fn parse(input: &str) -> EditorResult<Self> {
        let tokens = path_tokens()
            .parse(input)
            .into_result()
            .map_err(|errors| EditorError::path_data_error(format!("{:?}", errors), input))?;

        let mut commands: Vec<PathCommand> = Vec::new();
        for token in tokens {
            match token {
                PathToken::Command(letter) => commands.push(PathCommand {
                    letter,
                    args: Vec::new(),
                }),
                PathToken::Number(value) => match commands.last_mut() {
                    Some(command) => command.args.push(value),
                    None => commands.push(PathCommand {
                        letter: 'M',
                        args: vec![value],
                    }),
                },
            }
        }
        Ok(Self { commands })
    }

    /// Every number in drawing order, regardless of command
    pub fn numbers(&self) -> Vec<f64> {
        self.commands
            .iter()
            .flat_map(|c| c.args.iter().copied())
            .collect()
    }

    /// First coordinate pair and last coordinate pair as written
    ///
    /// `None` when the path has fewer than `min_numbers` numbers.
    pub fn literal_endpoints(&self, min_numbers: usize) -> Option<(Point, Point)> {
        let numbers = self.numbers();
        if numbers.len() < min_numbers.max(4) {
            return None;
        }
        let n = numbers.len();
        Some((
            Point::new(numbers[0], numbers[1]),
            Point::new(numbers[n - 2], numbers[n - 1]),
        ))
    }

    /// Number of straight `L` segments, including implicit ones after a move
    ///
    /// `H`/`V` runs are not counted; they trace axis-aligned outlines.
    pub fn line_segment_count(&self) -> usize {
        self.commands
            .iter()
            .map(|c| match c.letter {
                'L' | 'l' => c.args.len() / 2,
                'M' | 'm' => (c.args.len() / 2).saturating_sub(1),
                _ => 0,
            })
            .sum()
    }

    /// Absolute points visited by the path, control points included
    pub fn points(&self) -> Vec<Point> {
        let mut points = Vec::new();
        let mut current = Point::default();
        let mut subpath_start = current;

        for command in &self.commands {
            let relative = command.is_relative();
            let base = |origin: Point, x: f64, y: f64| {
                if relative {
                    origin.offset(x, y)
                } else {
                    Point::new(x, y)
                }
            };

            match command.letter.to_ascii_uppercase() {
                'M' | 'L' | 'T' => {
                    for (i, pair) in command.args.chunks_exact(2).enumerate() {
                        current = base(current, pair[0], pair[1]);
                        if i == 0 && command.letter.eq_ignore_ascii_case(&'M') {
                            subpath_start = current;
                        }
                        points.push(current);
                    }
                }
                'H' => {
                    for x in &command.args {
                        current.x = if relative { current.x + x } else { *x };
                        points.push(current);
                    }
                }
                'V' => {
                    for y in &command.args {
                        current.y = if relative { current.y + y } else { *y };
                        points.push(current);
                    }
                }
                'C' => {
                    for group in command.args.chunks_exact(6) {
                        let origin = current;
                        points.push(base(origin, group[0], group[1]));
                        points.push(base(origin, group[2], group[3]));
                        current = base(origin, group[4], group[5]);
                        points.push(current);
                    }
                }
                'S' | 'Q' => {
                    for group in command.args.chunks_exact(4) {
                        let origin = current;
                        points.push(base(origin, group[0], group[1]));
                        current = base(origin, group[2], group[3]);
                        points.push(current);
                    }
                }
                'A' => {
                    for group in command.args.chunks_exact(7) {
                        current = base(current, group[5], group[6]);
                        points.push(current);
                    }
                }
                'Z' => current = subpath_start,
                _ => {}
            }
        }
        points
    }
}

/// Incremental builder for path `d` strings
#[derive(Debug, Default)]
pub struct PathBuilder {
    parts: Vec<String>,
}

impl PathBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn move_to(mut self, p: Point) -> Self {
        self.parts.push(format!("M{}", p));
        self
    }

    pub fn line_to(mut self, p: Point) -> Self {
        self.parts.push(format!("L{}", p));
        self
    }

    pub fn cubic_to(mut self, c1: Point, c2: Point, end: Point) -> Self {
        self.parts.push(format!("C{} {} {}", c1, c2, end));
        self
    }

    pub fn build(self) -> String {
        self.parts.join(" ")
    }
}

/// Format points for a polygon `points` attribute
pub fn format_points(points: &[Point]) -> String {
    points
        .iter()
        .map(|p| p.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

/// One function of a `transform` attribute, e.g. `translate(10, 20)`
#[derive(Debug, Clone, PartialEq)]
pub struct TransformFunction {
    pub name: String,
    pub args: Vec<f64>,
}

/// Parsed `transform` attribute
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TransformList {
    pub functions: Vec<TransformFunction>,
}

impl TransformList {
    pub fn parse(input: &str) -> EditorResult<Self> {
        let functions = transform_functions()
            .parse(input)
            .into_result()
            .map_err(|errors| EditorError::path_data_error(format!("{:?}", errors), input))?;
        Ok(Self { functions })
    }

    /// Offset in the parent's coordinates
    ///
    /// Only the leading run of `translate`s counts. A translate that follows
    /// a `scale`, `rotate` or `matrix` acts in the transformed space, so it
    /// belongs to the rest of the list rather than to the element's position.
    pub fn translation(&self) -> Point {
        self.functions[..self.leading_translates()]
            .iter()
            .fold(Point::default(), |acc, f| {
                let x = f.args.first().copied().unwrap_or(0.0);
                let y = f.args.get(1).copied().unwrap_or(0.0);
                acc.offset(x, y)
            })
    }

    /// Serialize with the leading translates replaced by one `translate(offset)`
    ///
    /// Everything after them is kept in order, so `translation()` of the
    /// result is `offset` and the element's other transforms are unchanged.
    pub fn with_translation(&self, offset: Point) -> String {
        let translate = format!(
            "translate({}, {})",
            super::format_number(offset.x),
            super::format_number(offset.y)
        );
        std::iter::once(translate)
            .chain(
                self.functions[self.leading_translates()..]
                    .iter()
                    .map(|function| {
                        let args = function
                            .args
                            .iter()
                            .map(|a| super::format_number(*a))
                            .collect::<Vec<_>>()
                            .join(", ");
                        format!("{}({})", function.name, args)
                    }),
            )
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn leading_translates(&self) -> usize {
        self.functions
            .iter()
            .take_while(|f| f.name == "translate")
            .count()
    }
}
