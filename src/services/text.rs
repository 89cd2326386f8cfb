//! 文本清洗与 TF-IDF 相似度
//!
//! 相似度的向量空间只由参与比较的两篇文档构成，每次比较重新建立。

use std::collections::{BTreeMap, HashSet};
use std::sync::OnceLock;

/// 英文停用词
const STOPWORDS: &[&str] = &[
    "a", "about", "above", "after", "again", "against", "all", "also", "am", "an", "and", "any",
    "are", "as", "at", "be", "because", "been", "before", "being", "below", "between", "both",
    "but", "by", "can", "could", "did", "do", "does", "doing", "down", "during", "each", "either",
    "etc", "few", "for", "from", "further", "had", "has", "have", "having", "he", "her", "here",
    "hers", "herself", "him", "himself", "his", "how", "however", "i", "if", "in", "into", "is",
    "it", "its", "itself", "just", "me", "more", "most", "must", "my", "myself", "no", "nor",
    "not", "now", "of", "off", "on", "once", "only", "or", "other", "our", "ours", "ourselves",
    "out", "over", "own", "per", "same", "she", "should", "so", "some", "such", "than", "that",
    "the", "their", "theirs", "them", "themselves", "then", "there", "these", "they", "this",
    "those", "through", "to", "too", "under", "until", "up", "upon", "us", "very", "via", "was",
    "we", "well", "were", "what", "when", "where", "whether", "which", "while", "who", "whom",
    "why", "will", "with", "within", "without", "would", "yet", "you", "your", "yours",
    "yourself", "yourselves",
];

fn stopwords() -> &'static HashSet<&'static str> {
    static SET: OnceLock<HashSet<&'static str>> = OnceLock::new();
    SET.get_or_init(|| STOPWORDS.iter().copied().collect())
}

/// 清洗文本：小写，非 ASCII 字母数字替换为空格，合并空白
pub fn clean_text(text: &str) -> String {
    let replaced: String = text
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                ' '
            }
        })
        .collect();
    replaced.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// 已清洗文本按空格切词
pub fn words(clean: &str) -> Vec<String> {
    clean.split_whitespace().map(str::to_string).collect()
}

/// 整词短语在词序列中出现的次数
pub fn count_phrase(tokens: &[String], phrase: &[String]) -> usize {
    if phrase.is_empty() || phrase.len() > tokens.len() {
        return 0;
    }
    tokens.windows(phrase.len()).filter(|w| *w == phrase).count()
}

/// 文档的特征项：去停用词后的单词与相邻二元组
///
/// 少于两个字符的词不参与相似度计算。
pub fn terms(text: &str) -> Vec<String> {
    let stop = stopwords();
    let tokens: Vec<String> = clean_text(text)
        .split_whitespace()
        .filter(|t| t.len() >= 2 && !stop.contains(t))
        .map(str::to_string)
        .collect();

    let mut out = tokens.clone();
    out.extend(tokens.windows(2).map(|pair| format!("{} {}", pair[0], pair[1])));
    out
}

/// 文本相似度度量
pub trait TextSimilarity: Send + Sync {
    /// 返回 [0, 1] 之间的相似度
    fn similarity(&self, profile_text: &str, description: &str) -> f64;
}

/// 两篇文档上的 TF-IDF 余弦相似度
#[derive(Debug, Clone, Copy, Default)]
pub struct TfIdfCosine;

impl TextSimilarity for TfIdfCosine {
    fn similarity(&self, profile_text: &str, description: &str) -> f64 {
        let space = TfIdfSpace::build(&[profile_text, description]);
        space.cosine(0, 1)
    }
}

/// 小语料上的 TF-IDF 向量空间
pub struct TfIdfSpace {
    /// 每篇文档的 L2 归一化权重
    vectors: Vec<BTreeMap<String, f64>>,
}

impl TfIdfSpace {
    pub fn build(documents: &[&str]) -> Self {
        let counts: Vec<BTreeMap<String, f64>> = documents
            .iter()
            .map(|doc| {
                let mut tf = BTreeMap::new();
                for term in terms(doc) {
                    *tf.entry(term).or_insert(0.0) += 1.0;
                }
                tf
            })
            .collect();

        let mut df: BTreeMap<&str, f64> = BTreeMap::new();
        for tf in &counts {
            for term in tf.keys() {
                *df.entry(term.as_str()).or_insert(0.0) += 1.0;
            }
        }

        let n = documents.len() as f64;
        let vectors = counts
            .iter()
            .map(|tf| {
                let mut weights: BTreeMap<String, f64> = tf
                    .iter()
                    .map(|(term, count)| {
                        let doc_freq = df.get(term.as_str()).copied().unwrap_or(0.0);
                        let idf = ((1.0 + n) / (1.0 + doc_freq)).ln() + 1.0;
                        (term.clone(), count * idf)
                    })
                    .collect();
                let norm = weights.values().map(|w| w * w).sum::<f64>().sqrt();
                if norm > 0.0 {
                    for w in weights.values_mut() {
                        *w /= norm;
                    }
                }
                weights
            })
            .collect();

        Self { vectors }
    }

    /// 两篇文档的余弦相似度；任一为空向量时为 0
    pub fn cosine(&self, a: usize, b: usize) -> f64 {
        let (Some(va), Some(vb)) = (self.vectors.get(a), self.vectors.get(b)) else {
            return 0.0;
        };
        if va.is_empty() || vb.is_empty() {
            return 0.0;
        }
        let dot: f64 = va
            .iter()
            .filter_map(|(term, w)| vb.get(term).map(|v| w * v))
            .sum();
        dot.clamp(0.0, 1.0)
    }

    /// 文档权重最高的若干特征项（权重需大于 `min_weight`）
    pub fn top_terms(&self, doc: usize, limit: usize, min_weight: f64) -> Vec<String> {
        let Some(vector) = self.vectors.get(doc) else {
            return Vec::new();
        };
        let mut ranked: Vec<(&String, f64)> = vector
            .iter()
            .filter(|(_, w)| **w > min_weight)
            .map(|(t, w)| (t, *w))
            .collect();
        // BTreeMap 迭代已按词排序，稳定排序后同权重保持字典序
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranked
            .into_iter()
            .take(limit)
            .map(|(t, _)| t.clone())
            .collect()
    }
}

/// 保留三位小数
pub fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}
