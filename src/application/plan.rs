use std::collections::{BTreeSet, HashMap};

use crate::{Error, Result};

/// テーブル間の親子関係（親を先に取り込む）
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IngestPlan {
    tables: Vec<(String, Vec<String>)>,
}

impl IngestPlan {
    pub fn new() -> Self {
        Self::default()
    }

    /// テーブルと、その行が参照する親テーブルを追加する
    pub fn with_table<I, S>(mut self, table: impl Into<String>, parents: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tables
            .push((table.into(), parents.into_iter().map(Into::into).collect()));
        self
    }

    /// 取り込み順（トポロジカル順）を返す
    ///
    /// 親がすべて取り込まれたテーブルを段ごとにまとめ、各段の中は追加した順に並べる。
    /// 未知の親や循環は設定エラー。
    pub fn ordered(&self) -> Result<Vec<String>> {
        let mut position = HashMap::new();
        for (index, (table, _)) in self.tables.iter().enumerate() {
            if position.insert(table.as_str(), index).is_some() {
                return Err(Error::Config(format!("table {} appears twice in the ingest plan", table)));
            }
        }

        let mut indegree = vec![0usize; self.tables.len()];
        let mut children: Vec<Vec<usize>> = vec![Vec::new(); self.tables.len()];
        for (index, (table, parents)) in self.tables.iter().enumerate() {
            for parent in parents {
                let parent_index = *position.get(parent.as_str()).ok_or_else(|| {
                    Error::Config(format!("table {} depends on unknown table {}", table, parent))
                })?;
                children[parent_index].push(index);
                indegree[index] += 1;
            }
        }

        // Kahn's algorithm（段ごと）
        let mut wave: BTreeSet<usize> = (0..self.tables.len()).filter(|i| indegree[*i] == 0).collect();
        let mut order = Vec::with_capacity(self.tables.len());
        while !wave.is_empty() {
            let mut next_wave = BTreeSet::new();
            for index in wave {
                order.push(self.tables[index].0.clone());
                for child in &children[index] {
                    indegree[*child] -= 1;
                    if indegree[*child] == 0 {
                        next_wave.insert(*child);
                    }
                }
            }
            wave = next_wave;
        }

        if order.len() != self.tables.len() {
            let stuck: Vec<&str> = self
                .tables
                .iter()
                .enumerate()
                .filter(|(i, _)| indegree[*i] > 0)
                .map(|(_, (table, _))| table.as_str())
                .collect();
            return Err(Error::Config(format!("ingest plan has a cycle among {}", stuck.join(", "))));
        }

        Ok(order)
    }
}
