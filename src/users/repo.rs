use crate::auth::repo_types::User;
use sqlx::PgPool;
use uuid::Uuid;

impl User {
    /// Apply a partial profile update. Missing fields keep their prior values;
    /// email is not part of this statement and stays as stored.
    pub async fn update_profile(
        db: &PgPool,
        id: Uuid,
        name: Option<&str>,
        photo: Option<&str>,
        phone: Option<&str>,
        bio: Option<&str>,
    ) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET name  = COALESCE($2, name),
                photo = COALESCE($3, photo),
                phone = COALESCE($4, phone),
                bio   = COALESCE($5, bio)
            WHERE id = $1
            RETURNING id, name, email, password_hash, photo, phone, bio, created_at
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(photo)
        .bind(phone)
        .bind(bio)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }
}
