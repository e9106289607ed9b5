use anyhow::{anyhow, Result};
use std::collections::VecDeque;
use std::fmt::Display;
use std::str::FromStr;

/// Cursor over command-line words. `--flag=value` is split into two words.
#[derive(Debug)]
pub struct Args {
    words: VecDeque<String>,
}

impl Args {
    pub fn new<I: IntoIterator<Item = String>>(words: I) -> Self {
        let mut split = VecDeque::new();
        for word in words {
            match word.find('=') {
                Some(index) if word.starts_with("--") => {
                    split.push_back(word[..index].to_owned());
                    split.push_back(word[index + 1..].to_owned());
                }
                _ => split.push_back(word),
            }
        }
        Args { words: split }
    }

    pub fn next(&mut self) -> Option<String> {
        self.words.pop_front()
    }

    pub fn value(&mut self, flag: &str) -> Result<String> {
        self.next()
            .ok_or_else(|| anyhow!("`{}` needs a value", flag))
    }

    pub fn single<T>(&mut self, flag: &str) -> Result<T>
    where
        T: FromStr,
        T::Err: Display,
    {
        let value = self.value(flag)?;
        value
            .parse::<T>()
            .map_err(|e| anyhow!("Invalid value `{}` for `{}`: {}", value, flag, e))
    }
}
