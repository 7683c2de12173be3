//! Instruction text sent to the model.
//!
//! Screenshot questions use one of two templates, picked once from a
//! [`PromptContext`]. Step generation has its own template.

use screenpilot_types::{GoalContext, HistoryEntry};

/// Prior exchanges embedded in a goal-directed prompt
pub const MAX_HISTORY_ENTRIES: usize = 3;

const PLAIN_TEMPLATE: &str = "あなたはPC操作のサポート係です。ユーザーのスクリーンショットと質問を見て、以下の形式で回答してください：

## 状況要約
[スクリーンショットから読み取れる状況を簡潔に説明]

## 原因候補（優先順）
1. [最も可能性が高い原因]
2. [次に考えられる原因]
3. [その他の原因]

## すぐ試せる手順
1. [具体的な操作手順1]
2. [具体的な操作手順2]
3. [具体的な操作手順3]

## 追加で確認したい情報
- [確認すべき設定やログなど]
- [その他、問題解決に役立つ情報]

必ず上記の構造で回答し、ユーザーが即座に行動できる具体的な手順を提供してください。";

const GOAL_DIRECTED_TEMPLATE: &str = "あなたはPC操作のサポート係です。ユーザーのスクリーンショットと質問を見て、以下の形式で回答してください：

## 状況要約
[スクリーンショットから読み取れる状況を簡潔に説明]

## 次のステップ（優先順）
1. [まず最初にやるべきこと]
2. [その次にやるべきこと]
3. [さらに必要なこと]

## 具体的な操作手順
**重要: 画面に表示されている要素（ボタン名、リンク、入力欄など）を具体的に指定してください**

1. **[操作1]**
   - 画面の[位置]にある「[ボタン/リンク名]」をクリック
   - または、[入力欄の名前]に「[入力する値]」を入力

2. **[操作2]**
   - [具体的な要素名]を探して[操作]

3. **[操作3]**
   - [詳細な手順]

## 注意点・ヒント
- [気をつけるべきこと]
- [うまくいかない場合の対処法]
- [見落としがちなポイント]

**画面上の要素を具体的に指示すること！** 例：
- 「右上の『設定』ボタンをクリック」
- 「API Key という欄に、取得したキーを貼り付け」
- 「画面下部の青い『保存』ボタンを押す」

必ず上記の構造で回答し、ユーザーが迷わず操作できるよう、画面に見える要素を具体的に指示してください。";

const GOAL_REMINDER: &str =
    "ユーザーの最終目標を常に意識して、そこに向かって進むためのアドバイスをしてください。";

/// Which screenshot template to use, decided once at the request boundary
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptContext {
    Plain,
    GoalDirected {
        goal: Option<GoalContext>,
        /// Oldest first; only the newest [`MAX_HISTORY_ENTRIES`] are kept
        history: Vec<HistoryEntry>,
    },
}

impl PromptContext {
    /// Goal-directed whenever a goal is present or a history list was
    /// supplied at all (an empty list still counts).
    pub fn from_request(goal: Option<GoalContext>, history: Option<Vec<HistoryEntry>>) -> Self {
        if goal.is_none() && history.is_none() {
            return PromptContext::Plain;
        }

        let mut history = history.unwrap_or_default();
        let excess = history.len().saturating_sub(MAX_HISTORY_ENTRIES);
        history.drain(..excess);

        PromptContext::GoalDirected { goal, history }
    }

    pub fn is_goal_directed(&self) -> bool {
        matches!(self, PromptContext::GoalDirected { .. })
    }
}

pub fn compose_prompt(question: &str, context: &PromptContext) -> String {
    match context {
        PromptContext::Plain => format!("{}\n\nユーザーの質問: {}", PLAIN_TEMPLATE, question),
        PromptContext::GoalDirected { goal, history } => {
            let mut prompt = String::new();

            if let Some(goal) = goal {
                prompt.push_str(&goal_block(goal));
            }
            if !history.is_empty() {
                prompt.push_str(&history_block(history));
            }

            prompt.push_str(GOAL_DIRECTED_TEMPLATE);
            if goal.is_some() {
                prompt.push_str("\n\n");
                prompt.push_str(GOAL_REMINDER);
            }

            prompt.push_str("\n\nユーザーの質問: ");
            prompt.push_str(question);
            prompt
        }
    }
}

fn goal_block(goal: &GoalContext) -> String {
    let mut block = format!(
        "【ユーザーの目標】\n- 目標: {}\n- 現在の状況: {}\n",
        goal.objective, goal.current_status
    );
    if let Some(deadline) = &goal.deadline {
        block.push_str(&format!("- 期限: {}\n", deadline));
    }
    block.push('\n');
    block
}

fn history_block(history: &[HistoryEntry]) -> String {
    let mut block = String::from("【これまでの会話（古い順）】\n");
    for (i, entry) in history.iter().enumerate() {
        block.push_str(&format!(
            "{}. 質問: {}\n   回答: {}\n",
            i + 1,
            entry.question,
            entry.answer
        ));
    }
    block.push('\n');
    block
}

/// Template for breaking a goal into an ordered task list with web search
pub fn compose_step_prompt(goal_title: &str, description: Option<&str>) -> String {
    let details = match description.map(str::trim).filter(|d| !d.is_empty()) {
        Some(d) => format!("【詳細・現在の状況】\n{}\n\n", d),
        None => String::new(),
    };

    format!(
        "あなたは目標達成のサポートアシスタントです。以下の目標を達成するための詳細で具体的なステップを作成してください。

【目標】
{title}

{details}【重要な指示】
1. まず、Google検索で「{title}」について調べてください
2. 公式サイト、チュートリアル、ダウンロードページを探してください
3. 検索結果を基に、以下の観点で具体的なステップ（5-10個）を時系列順に作成してください：
   - 公式サイトや公式ドキュメントのURL
   - 具体的なダウンロード方法やインストール手順
   - 初期設定や環境構築の方法
   - 簡単な使い方や実践例
   - 具体的なツール名、サービス名、技術名
4. 初心者でもわかる表現を使ってください

【出力形式】
以下のJSON配列のみを出力してください。説明文やコードブロック記号（```）は含めないでください:
[
  {{
    \"title\": \"公式サイトにアクセス\",
    \"description\": \"https://example.com にアクセスして、ダウンロードページを開く\"
  }},
  {{
    \"title\": \"ダウンロードとインストール\",
    \"description\": \"インストーラーをダウンロードし、実行してセットアップを完了する\"
  }}
]",
        title = goal_title,
        details = details,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn history(n: usize) -> Vec<HistoryEntry> {
        (1..=n)
            .map(|i| HistoryEntry::new(format!("q{}", i), format!("a{}", i)))
            .collect()
    }

    #[test]
    fn test_plain_template() {
        let context = PromptContext::from_request(None, None);
        let prompt = compose_prompt("q", &context);

        assert_eq!(context, PromptContext::Plain);
        assert!(prompt.contains("原因候補"));
        assert!(!prompt.contains("次のステップ"));
        assert!(prompt.ends_with("ユーザーの質問: q"));
    }

    #[test]
    fn test_goal_selects_goal_directed_template() {
        let goal = GoalContext::new("Deploy the site", "DNS configured");
        let prompt = compose_prompt("q", &PromptContext::from_request(Some(goal), None));

        assert!(prompt.contains("次のステップ"));
        assert!(prompt.contains("具体的な操作手順"));
        assert!(!prompt.contains("原因候補"));
        assert!(prompt.starts_with("【ユーザーの目標】"));
        assert!(prompt.contains("- 目標: Deploy the site"));
        assert!(prompt.contains("- 現在の状況: DNS configured"));
        assert!(!prompt.contains("期限"));
        assert!(prompt.contains(GOAL_REMINDER));
    }

    #[test]
    fn test_deadline_included_when_present() {
        let goal = GoalContext::new("Deploy", "Started").with_deadline("2026-12-01");
        let prompt = compose_prompt("q", &PromptContext::from_request(Some(goal), None));

        assert!(prompt.contains("- 期限: 2026-12-01"));
    }

    #[test]
    fn test_history_without_goal_uses_full_template() {
        let context = PromptContext::from_request(None, Some(history(1)));
        let prompt = compose_prompt("q", &context);

        assert!(prompt.contains("次のステップ"));
        assert!(prompt.contains("具体的な操作手順"));
        assert!(!prompt.contains("【ユーザーの目標】"));
        assert!(!prompt.contains(GOAL_REMINDER));
        assert!(prompt.contains("質問: q1"));
    }

    #[test]
    fn test_empty_history_still_goal_directed() {
        let context = PromptContext::from_request(None, Some(vec![]));
        assert!(context.is_goal_directed());
        assert!(!compose_prompt("q", &context).contains("【これまでの会話"));
    }

    #[test]
    fn test_only_three_most_recent_exchanges() {
        let context = PromptContext::from_request(None, Some(history(5)));
        let prompt = compose_prompt("q", &context);

        assert!(!prompt.contains("q1\n"));
        assert!(!prompt.contains("q2\n"));
        let q3 = prompt.find("質問: q3").unwrap();
        let q5 = prompt.find("質問: q5").unwrap();
        assert!(q3 < q5);

        match context {
            PromptContext::GoalDirected { history, .. } => assert_eq!(history.len(), 3),
            PromptContext::Plain => panic!("expected goal-directed context"),
        }
    }

    #[test]
    fn test_step_prompt() {
        let prompt = compose_step_prompt("Learn Python", Some("  No experience  "));

        assert!(prompt.contains("【目標】\nLearn Python"));
        assert!(prompt.contains("【詳細・現在の状況】\nNo experience"));
        assert!(prompt.contains("Google検索"));
        assert!(prompt.contains("5-10個"));
        assert!(prompt.contains("JSON配列のみ"));
        assert!(prompt.contains("\"title\": \"公式サイトにアクセス\""));
    }

    #[test]
    fn test_step_prompt_without_description() {
        let prompt = compose_step_prompt("Learn Python", Some("   "));
        assert!(!prompt.contains("【詳細"));
        assert_eq!(prompt, compose_step_prompt("Learn Python", None));
    }
}
