//! 棋局存储系统
//!
//! 把对局记录和统计报告以 JSON 写入输出目录

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use protocol::{GameRecord, GameResult};
use serde::Serialize;

/// 存储管理器
pub struct StorageManager {
    saves_dir: PathBuf,
}

impl StorageManager {
    /// 创建存储管理器，目录不存在时创建
    pub fn new(saves_dir: impl Into<PathBuf>) -> Result<Self> {
        let saves_dir = saves_dir.into();

        if !saves_dir.exists() {
            fs::create_dir_all(&saves_dir)
                .with_context(|| format!("Failed to create output directory: {:?}", saves_dir))?;
        }

        Ok(Self { saves_dir })
    }

    /// 保存棋局，返回文件名
    pub fn save_game(&self, record: &GameRecord) -> Result<String> {
        let timestamp = Utc::now();
        let stem = format!(
            "game_{}",
            generate_stem(
                &timestamp,
                &record.metadata.white_player,
                &record.metadata.black_player
            )
        );
        let filepath = self.unique_path(&stem);

        let json_content = record.to_json().context("Failed to serialize game record")?;

        fs::write(&filepath, json_content)
            .with_context(|| format!("Failed to write file: {:?}", filepath))?;

        Ok(file_name(&filepath))
    }

    /// 保存统计报告，返回完整路径
    pub fn save_report<T: Serialize>(&self, kind: &str, report: &T) -> Result<PathBuf> {
        let timestamp = Utc::now();
        let stem = format!(
            "{}_{}",
            sanitize_filename(kind),
            timestamp.format("%Y%m%d_%H%M%S")
        );
        let filepath = self.unique_path(&stem);

        let json_content =
            serde_json::to_string_pretty(report).context("Failed to serialize report")?;

        fs::write(&filepath, json_content)
            .with_context(|| format!("Failed to write file: {:?}", filepath))?;

        Ok(filepath)
    }

    /// 加载棋局
    pub fn load_game(&self, game_id: &str) -> Result<GameRecord> {
        let filepath = self.saves_dir.join(game_id);

        if !filepath.exists() {
            anyhow::bail!("Game file not found: {}", game_id);
        }

        let content = fs::read_to_string(&filepath)
            .with_context(|| format!("Failed to read file: {:?}", filepath))?;

        GameRecord::from_json(&content).context("Failed to parse game record")
    }

    /// 列出所有保存的棋局（报告等其他 JSON 文件跳过）
    pub fn list_saved_games(&self) -> Result<Vec<SavedGameInfo>> {
        let mut games = Vec::new();

        if !self.saves_dir.exists() {
            return Ok(games);
        }

        let entries = fs::read_dir(&self.saves_dir)
            .with_context(|| format!("Failed to read output directory: {:?}", self.saves_dir))?;

        for entry in entries {
            let entry = entry.context("Failed to read directory entry")?;
            let path = entry.path();

            if path.extension().and_then(|s| s.to_str()) != Some("json") {
                continue;
            }
            let Some(filename) = path.file_name().and_then(|s| s.to_str()) else {
                continue;
            };
            let Ok(record) = self.load_game(filename) else {
                continue;
            };
            let saved_at = entry
                .metadata()
                .and_then(|m| m.modified())
                .map(DateTime::from)
                .unwrap_or_else(|_| Utc::now());

            games.push(SavedGameInfo {
                game_id: filename.to_string(),
                white_player: record.metadata.white_player,
                black_player: record.metadata.black_player,
                result: record.metadata.result,
                saved_at,
                move_count: record.moves.len(),
            });
        }

        // 新的在前，同一时刻按文件名
        games.sort_by(|a, b| {
            b.saved_at
                .cmp(&a.saved_at)
                .then_with(|| b.game_id.cmp(&a.game_id))
        });
        Ok(games)
    }

    /// 删除保存的棋局
    pub fn delete_game(&self, game_id: &str) -> Result<()> {
        let filepath = self.saves_dir.join(game_id);

        if filepath.exists() {
            fs::remove_file(&filepath)
                .with_context(|| format!("Failed to delete file: {:?}", filepath))?;
        }

        Ok(())
    }

    /// 获取存储目录路径
    pub fn saves_directory(&self) -> &Path {
        &self.saves_dir
    }

    /// 同名文件已存在时追加序号
    fn unique_path(&self, stem: &str) -> PathBuf {
        let mut candidate = self.saves_dir.join(format!("{}.json", stem));
        let mut counter = 1;
        while candidate.exists() {
            candidate = self.saves_dir.join(format!("{}_{}.json", stem, counter));
            counter += 1;
        }
        candidate
    }
}

/// 保存的棋局信息
#[derive(Debug, Clone)]
pub struct SavedGameInfo {
    /// 棋局 ID（文件名）
    pub game_id: String,
    pub white_player: String,
    pub black_player: String,
    pub result: Option<GameResult>,
    /// 保存时间
    pub saved_at: DateTime<Utc>,
    /// 走法数量
    pub move_count: usize,
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// 生成文件名主干
fn generate_stem(timestamp: &DateTime<Utc>, white_player: &str, black_player: &str) -> String {
    let timestamp_str = timestamp.format("%Y%m%d_%H%M%S").to_string();

    let clean_white = sanitize_filename(white_player);
    let clean_black = sanitize_filename(black_player);

    format!("{}_{}_vs_{}", timestamp_str, clean_white, clean_black)
}

/// 清理文件名中的特殊字符
fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' | ' ' | '(' | ')' | ',' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect::<String>()
        .trim_matches('_')
        .to_string()
}
