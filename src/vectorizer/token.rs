use indexmap::IndexMap;

/// TokenFrequency 構造体
/// 1文書内のtokenの出現回数を管理するための構造体です
///
/// distinct token は最初に現れた順で保持されます
///
/// # Examples
/// ```
/// use rocchio_classifier::TokenFrequency;
/// let freq: TokenFrequency = ["cat", "dog", "cat"].iter().collect();
/// assert_eq!(freq.iter().collect::<Vec<_>>(), vec![("cat", 2), ("dog", 1)]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenFrequency {
    token_count: IndexMap<String, u32>,
}

impl TokenFrequency {
    pub fn new() -> Self {
        TokenFrequency {
            token_count: IndexMap::new(),
        }
    }

    /// tokenを追加する
    #[inline]
    pub fn add_token(&mut self, token: &str) -> &mut Self {
        match self.token_count.get_mut(token) {
            Some(count) => *count += 1,
            None => {
                self.token_count.insert(token.to_string(), 1);
            }
        }
        self
    }

    /// (token, count) を最初に現れた順で返す
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.token_count.iter().map(|(token, &count)| (token.as_str(), count))
    }
}

impl<T> FromIterator<T> for TokenFrequency
where
    T: AsRef<str>,
{
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut freq = TokenFrequency::new();
        for token in iter {
            freq.add_token(token.as_ref());
        }
        freq
    }
}
