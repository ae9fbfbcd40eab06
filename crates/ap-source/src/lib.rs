/// Image decoding and output-size resolution for asciiparser.

pub mod image;
pub mod sizing;
