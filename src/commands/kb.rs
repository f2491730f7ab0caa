use anyhow::Result;

use helpdesk::models::ArticleFilter;
use helpdesk::Services;

use super::list::truncate;

pub fn add(
    services: &Services,
    title: &str,
    body: &str,
    category: Option<&str>,
    draft: bool,
) -> Result<()> {
    let article = services
        .knowledge_base
        .create_article(title, body, category, !draft)?;
    let state = if article.published { "published" } else { "draft" };
    println!("Created article #{} ({}): {}", article.id, state, article.title);
    Ok(())
}

pub fn search(services: &Services, query: Option<&str>, drafts: bool) -> Result<()> {
    let articles = services.knowledge_base.search(ArticleFilter {
        query: query.map(str::to_string),
        category: None,
        include_drafts: drafts,
    })?;

    if articles.is_empty() {
        println!("No articles found.");
        return Ok(());
    }

    for article in articles {
        let draft = if article.published { "" } else { " [draft]" };
        println!(
            "#{:<4} {:<14} {}{}",
            article.id,
            article.category.as_deref().unwrap_or("-"),
            truncate(&article.title, 50),
            draft
        );
    }
    Ok(())
}

pub fn show(services: &Services, id: i64) -> Result<()> {
    let article = services.knowledge_base.get_article(id)?;
    println!("Article #{}: {}", article.id, article.title);
    if let Some(category) = &article.category {
        println!("Category: {}", category);
    }
    if !article.published {
        println!("Status:   draft");
    }
    println!("Updated:  {}", article.updated_at.format("%Y-%m-%d %H:%M:%S"));
    println!();
    println!("{}", article.body);
    Ok(())
}
