use crate::models::profile::CandidateProfile;
use anyhow::{Context, Result};
use std::path::Path;
use tokio::fs;

/// 从 TOML 文件加载候选人资料
pub async fn load_profile(toml_file_path: &Path) -> Result<CandidateProfile> {
    let content = fs::read_to_string(toml_file_path)
        .await
        .with_context(|| format!("无法读取资料文件: {}", toml_file_path.display()))?;

    let profile: CandidateProfile = toml::from_str(&content)
        .with_context(|| format!("无法解析资料文件: {}", toml_file_path.display()))?;

    if profile.resume_text.trim().is_empty() {
        tracing::warn!(
            "资料文件 {} 中简历文本为空，所有职位的相似度都将为 0",
            toml_file_path.display()
        );
    }

    if let Some(resume) = &profile.resume_path {
        if !resume.exists() {
            tracing::warn!("简历文件不存在，表单上传将被跳过: {}", resume.display());
        }
    }

    tracing::info!(
        "成功加载候选人资料: {} ({} 字符)",
        profile.name,
        profile.resume_text.chars().count()
    );

    Ok(profile)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_load_profile_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("profile.toml");
        std::fs::write(
            &path,
            r#"
name = "Alex Morgan"
email = "alex@example.com"
phone = "07700 900123"
resume_text = "Economist with econometrics and stata experience"

[answers]
salary = "42000"
"#,
        )
        .unwrap();

        let profile = load_profile(&path).await.unwrap();
        assert_eq!(profile.name, "Alex Morgan");
        assert_eq!(profile.answers.salary, "42000");
        assert_eq!(profile.answers.notice, "2 weeks");
        assert!(profile.cover_letter_template.is_none());
    }

    #[tokio::test]
    async fn test_load_profile_missing_file() {
        let err = load_profile(Path::new("/definitely/not/here.toml"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("无法读取资料文件"));
    }
}
