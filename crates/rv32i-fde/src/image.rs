//! Hex program images.
//!
//! The format is what a C array initialiser of instruction words looks like:
//! hex words separated by commas or whitespace, optionally `0x`-prefixed,
//! with `//` or `#` comments.
//!
//! ```text
//! 0x00500093, // addi x1, x0, 5
//! 0x00008067  // ret
//! ```

use alloc::{format, vec::Vec};

use nom::{
    bytes::complete::{tag_no_case, take_while, take_while1},
    character::complete::hex_digit1,
    combinator::{all_consuming, map_res, opt},
    multi::separated_list0,
    sequence::{delimited, preceded},
    IResult,
};

use crate::error::EmulatorError;

fn is_separator(c: char) -> bool {
    c == ',' || c.is_whitespace()
}

fn hex_word(input: &str) -> IResult<&str, u32> {
    map_res(preceded(opt(tag_no_case("0x")), hex_digit1), |digits: &str| {
        u32::from_str_radix(digits, 16)
    })(input)
}

fn words_line(input: &str) -> IResult<&str, Vec<u32>> {
    delimited(
        take_while(is_separator),
        separated_list0(take_while1(is_separator), hex_word),
        take_while(is_separator),
    )(input)
}

fn strip_comment(text: &str) -> &str {
    let end = [text.find('#'), text.find("//")]
        .into_iter()
        .flatten()
        .min()
        .unwrap_or(text.len());
    &text[..end]
}

/// Parse a hex image into instruction words, in file order.
pub fn parse_hex_image(text: &str) -> Result<Vec<u32>, EmulatorError> {
    let mut words = Vec::new();
    for (idx, line) in text.lines().enumerate() {
        let code = strip_comment(line);
        let (_, parsed) = all_consuming(words_line)(code).map_err(|_| EmulatorError::ImageParse {
            line: idx + 1,
            reason: format!("expected 32-bit hex words, found `{}`", code.trim()),
        })?;
        words.extend(parsed);
    }
    Ok(words)
}
