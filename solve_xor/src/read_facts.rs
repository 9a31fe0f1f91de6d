use std::{io::BufRead, str::FromStr};

use color_eyre::eyre::{Result, eyre};
use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::tag,
    character::complete::{digit1, line_ending, not_line_ending, space0},
    combinator::{map, map_res, opt, recognize, value, verify},
    sequence::delimited,
};
use num::{Integer, Signed};
use xor_engine::{Boolean, Literal, Parity, ParityFact};

/// 変数番号の上限
pub const MAXIMUM_VARIABLE: u64 = 1 << 24;

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Line {
    Blank,
    Comment(String),
    Fact(Fact),
}

/// `__parity(constraint_id, parity, literal).`
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Fact {
    pub constraint_id: usize,
    pub parity: Parity,
    pub literal: i64,
}

impl Fact {
    pub fn to_parity_fact(&self) -> ParityFact {
        return ParityFact {
            constraint_id: self.constraint_id,
            parity: self.parity,
            literal: Literal::new(
                self.literal.unsigned_abs() as usize - 1,
                Boolean::from(self.literal > 0),
            ),
        };
    }
}

pub fn read_facts(input: &mut std::io::BufReader<impl std::io::Read>) -> Result<Vec<Fact>> {
    let mut facts = Vec::default();

    let mut buffer = String::default();
    for line_number in 1.. {
        buffer.clear();
        if input.read_line(&mut buffer)? == 0 {
            break;
        }
        let Ok((residual, line)) = line(buffer.as_str()) else {
            return Err(eyre!("line {}: cannot parse `{}`", line_number, buffer.trim_end()));
        };
        if !residual.is_empty() {
            return Err(eyre!(
                "line {}: unexpected `{}`",
                line_number,
                residual.trim_end()
            ));
        }

        if let Line::Fact(fact) = line {
            if fact.literal.unsigned_abs() > MAXIMUM_VARIABLE {
                return Err(eyre!(
                    "line {}: variable {} exceeds {}",
                    line_number,
                    fact.literal.unsigned_abs(),
                    MAXIMUM_VARIABLE
                ));
            }
            facts.push(fact);
        }
    }

    return Ok(facts);
}

fn line(input: &str) -> IResult<&str, Line> {
    // <line> ::= <space0> [<comment> | <fact>] <space0> [<EOL>]
    map(
        (
            space0,
            opt(alt((map(comment, Line::Comment), map(fact, Line::Fact)))),
            space0,
            opt(line_ending),
        ),
        |(_, line, _, _)| line.unwrap_or(Line::Blank),
    )
    .parse(input)
}

fn comment(input: &str) -> IResult<&str, String> {
    // <comment> ::= "%" <any_sequence_of_characters_other_than_EOL>
    map((tag("%"), not_line_ending), |(_, comment)| {
        str::to_string(comment)
    })
    .parse(input)
}

fn fact(input: &str) -> IResult<&str, Fact> {
    // <fact> ::= "__parity(" <unsigned_integer> "," <parity> "," <literal> ")."
    map(
        (
            tag("__parity("),
            delimited(space0, unsigined_integer::<usize>, space0),
            tag(","),
            delimited(space0, parity, space0),
            tag(","),
            delimited(space0, literal, space0),
            tag(")."),
        ),
        |(_, constraint_id, _, parity, _, literal, _)| Fact {
            constraint_id,
            parity,
            literal,
        },
    )
    .parse(input)
}

fn parity(input: &str) -> IResult<&str, Parity> {
    // <parity> ::= "even" | "odd"
    alt((
        value(Parity::Even, tag("even")),
        value(Parity::Odd, tag("odd")),
    ))
    .parse(input)
}

fn literal(input: &str) -> IResult<&str, i64> {
    // <literal> ::= <integer> (0 を除く)
    verify(integer::<i64>, |literal: &i64| *literal != 0).parse(input)
}

fn integer<IntT: Signed + FromStr>(input: &str) -> IResult<&str, IntT> {
    // <integer> ::= ["+" | "-"] <unsigned_integer>
    map_res(
        recognize((opt(alt((tag("+"), tag("-")))), digit1)),
        str::parse,
    )
    .parse(input)
}

fn unsigined_integer<UIntT: Integer + FromStr>(input: &str) -> IResult<&str, UIntT> {
    // <unsigned_integer> ::= <digit> | <digit><unsigned_integer>
    map_res(digit1, str::parse).parse(input)
}
