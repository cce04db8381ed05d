//! Stemmers, selected by name.
//!
//! - `porter`: Martin Porter's 1980 suffix-stripping algorithm.
//! - `snowball` / `snowball-<language>`: Snowball stemmers from
//!   [`rust_stemmers`]; bare `snowball` means English.

use std::fmt;

use rust_stemmers::Algorithm;

use split_core::{Result, SplitError};

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Maps a normalized token to its root form.
pub trait TokenStemmer: Send + Sync {
    fn stem(&self, token: &str) -> String;

    /// The configured name this stemmer answers to.
    fn name(&self) -> &str;
}

/// Build the stemmer for `name`.
pub fn create_stemmer(name: &str) -> Result<Box<dyn TokenStemmer>> {
    match name {
        "porter" | "PorterStemmer" => Ok(Box::new(PorterStemmer)),
        "snowball" => Ok(Box::new(SnowballStemmer::new(Algorithm::English, name))),
        other => {
            let algorithm = other
                .strip_prefix("snowball-")
                .and_then(snowball_algorithm)
                .ok_or_else(|| SplitError::UnknownStemmer(other.to_string()))?;
            Ok(Box::new(SnowballStemmer::new(algorithm, other)))
        }
    }
}

fn snowball_algorithm(language: &str) -> Option<Algorithm> {
    let algorithm = match language {
        "arabic" => Algorithm::Arabic,
        "danish" => Algorithm::Danish,
        "dutch" => Algorithm::Dutch,
        "english" => Algorithm::English,
        "finnish" => Algorithm::Finnish,
        "french" => Algorithm::French,
        "german" => Algorithm::German,
        "greek" => Algorithm::Greek,
        "hungarian" => Algorithm::Hungarian,
        "italian" => Algorithm::Italian,
        "norwegian" => Algorithm::Norwegian,
        "portuguese" => Algorithm::Portuguese,
        "romanian" => Algorithm::Romanian,
        "russian" => Algorithm::Russian,
        "spanish" => Algorithm::Spanish,
        "swedish" => Algorithm::Swedish,
        "tamil" => Algorithm::Tamil,
        "turkish" => Algorithm::Turkish,
        _ => return None,
    };
    Some(algorithm)
}

// ---------------------------------------------------------------------------
// Snowball
// ---------------------------------------------------------------------------

pub struct SnowballStemmer {
    inner: rust_stemmers::Stemmer,
    name: String,
}

impl SnowballStemmer {
    pub fn new(algorithm: Algorithm, name: impl Into<String>) -> Self {
        Self {
            inner: rust_stemmers::Stemmer::create(algorithm),
            name: name.into(),
        }
    }
}

impl fmt::Debug for SnowballStemmer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SnowballStemmer").field("name", &self.name).finish()
    }
}

impl TokenStemmer for SnowballStemmer {
    fn stem(&self, token: &str) -> String {
        self.inner.stem(token).into_owned()
    }

    fn name(&self) -> &str {
        &self.name
    }
}

// ---------------------------------------------------------------------------
// Porter
// ---------------------------------------------------------------------------

/// The original Porter stemmer.
///
/// Input is lowercased first; words of one or two characters are returned
/// unchanged. Letters outside `a-z` count as consonants.
#[derive(Debug, Clone, Copy, Default)]
pub struct PorterStemmer;

impl TokenStemmer for PorterStemmer {
    fn stem(&self, token: &str) -> String {
        if token.chars().count() <= 2 {
            return token.to_string();
        }
        let mut word = PorterWord::new(&token.to_lowercase());
        word.step1ab();
        if word.k > 0 {
            word.step1c();
            word.step2();
            word.step3();
            word.step4();
            word.step5();
        }
        word.finish()
    }

    fn name(&self) -> &str {
        "porter"
    }
}

const STEP2: &[(&str, &str)] = &[
    ("ational", "ate"),
    ("tional", "tion"),
    ("enci", "ence"),
    ("anci", "ance"),
    ("izer", "ize"),
    ("bli", "ble"),
    ("alli", "al"),
    ("entli", "ent"),
    ("eli", "e"),
    ("ousli", "ous"),
    ("ization", "ize"),
    ("ation", "ate"),
    ("ator", "ate"),
    ("alism", "al"),
    ("iveness", "ive"),
    ("fulness", "ful"),
    ("ousness", "ous"),
    ("aliti", "al"),
    ("iviti", "ive"),
    ("biliti", "ble"),
    ("logi", "log"),
];

const STEP3: &[(&str, &str)] = &[
    ("icate", "ic"),
    ("ative", ""),
    ("alize", "al"),
    ("iciti", "ic"),
    ("ical", "ic"),
    ("ful", ""),
    ("ness", ""),
];

/// `ion` is handled separately: it only strips after `s` or `t`.
const STEP4: &[&str] = &[
    "al", "ance", "ence", "er", "ic", "able", "ible", "ant", "ement", "ment", "ent", "ou", "ism",
    "ate", "iti", "ous", "ive", "ize",
];

/// Working buffer. `b[..=k]` is the current word; `j` marks the end of the
/// stem after a successful [`PorterWord::ends`] and may be -1.
struct PorterWord {
    b: Vec<char>,
    k: isize,
    j: isize,
}

impl PorterWord {
    fn new(word: &str) -> Self {
        let b: Vec<char> = word.chars().collect();
        let k = b.len() as isize - 1;
        Self { b, k, j: 0 }
    }

    fn finish(&self) -> String {
        self.b[..=self.k as usize].iter().collect()
    }

    fn at(&self, i: isize) -> char {
        self.b[i as usize]
    }

    fn cons(&self, i: isize) -> bool {
        match self.at(i) {
            'a' | 'e' | 'i' | 'o' | 'u' => false,
            'y' => i == 0 || !self.cons(i - 1),
            _ => true,
        }
    }

    /// Number of vowel-consonant sequences in `b[..=j]`.
    fn measure(&self) -> usize {
        let mut n = 0;
        let mut i = 0;
        loop {
            if i > self.j {
                return n;
            }
            if !self.cons(i) {
                break;
            }
            i += 1;
        }
        i += 1;
        loop {
            loop {
                if i > self.j {
                    return n;
                }
                if self.cons(i) {
                    break;
                }
                i += 1;
            }
            i += 1;
            n += 1;
            loop {
                if i > self.j {
                    return n;
                }
                if !self.cons(i) {
                    break;
                }
                i += 1;
            }
            i += 1;
        }
    }

    fn vowel_in_stem(&self) -> bool {
        (0..=self.j).any(|i| !self.cons(i))
    }

    fn double_cons(&self, i: isize) -> bool {
        i >= 1 && self.at(i) == self.at(i - 1) && self.cons(i)
    }

    /// consonant-vowel-consonant ending at `i`, last consonant not w, x or y.
    fn cvc(&self, i: isize) -> bool {
        if i < 2 || !self.cons(i) || self.cons(i - 1) || !self.cons(i - 2) {
            return false;
        }
        !matches!(self.at(i), 'w' | 'x' | 'y')
    }

    fn ends(&mut self, suffix: &str) -> bool {
        let len = suffix.chars().count() as isize;
        if len > self.k + 1 {
            return false;
        }
        let start = (self.k - len + 1) as usize;
        if !self.b[start..=self.k as usize]
            .iter()
            .copied()
            .eq(suffix.chars())
        {
            return false;
        }
        self.j = self.k - len;
        true
    }

    fn set_to(&mut self, replacement: &str) {
        self.b.truncate((self.j + 1) as usize);
        self.b.extend(replacement.chars());
        self.k = self.j + replacement.chars().count() as isize;
    }

    fn replace_if_measured(&mut self, replacement: &str) {
        if self.measure() > 0 {
            self.set_to(replacement);
        }
    }

    /// Plurals and -ed / -ing.
    fn step1ab(&mut self) {
        if self.at(self.k) == 's' {
            if self.ends("sses") {
                self.k -= 2;
            } else if self.ends("ies") {
                self.set_to("i");
            } else if self.at(self.k - 1) != 's' {
                self.k -= 1;
            }
        }
        if self.ends("eed") {
            if self.measure() > 0 {
                self.k -= 1;
            }
        } else if (self.ends("ed") || self.ends("ing")) && self.vowel_in_stem() {
            self.k = self.j;
            if self.ends("at") {
                self.set_to("ate");
            } else if self.ends("bl") {
                self.set_to("ble");
            } else if self.ends("iz") {
                self.set_to("ize");
            } else if self.double_cons(self.k) {
                self.k -= 1;
                if matches!(self.at(self.k), 'l' | 's' | 'z') {
                    self.k += 1;
                }
            } else if self.measure() == 1 && self.cvc(self.k) {
                self.set_to("e");
            }
        }
    }

    /// Terminal y to i when there is another vowel in the stem.
    fn step1c(&mut self) {
        if self.ends("y") && self.vowel_in_stem() {
            let k = self.k as usize;
            self.b[k] = 'i';
        }
    }

    fn step2(&mut self) {
        self.replace_first(STEP2);
    }

    fn step3(&mut self) {
        self.replace_first(STEP3);
    }

    fn step4(&mut self) {
        let matched = STEP4.iter().any(|suffix| self.ends(suffix))
            || (self.ends("ion") && self.j >= 0 && matches!(self.at(self.j), 's' | 't'));
        if matched && self.measure() > 1 {
            self.k = self.j;
        }
    }

    /// Final -e and -ll.
    fn step5(&mut self) {
        self.j = self.k;
        if self.at(self.k) == 'e' {
            let m = self.measure();
            if m > 1 || (m == 1 && !self.cvc(self.k - 1)) {
                self.k -= 1;
            }
        }
        if self.at(self.k) == 'l' && self.double_cons(self.k) && self.measure() > 1 {
            self.k -= 1;
        }
    }

    fn replace_first(&mut self, rules: &[(&str, &str)]) {
        for (suffix, replacement) in rules {
            if self.ends(suffix) {
                self.replace_if_measured(replacement);
                return;
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
