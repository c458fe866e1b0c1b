use std::collections::HashMap;

use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{Store, StoreError};
use crate::models::{
    Course, CourseChanges, NewCourse, NewPrincipal, Principal, PrincipalKind, Purchase,
};

#[derive(Default)]
struct Inner {
    principals: HashMap<PrincipalKind, Vec<Principal>>,
    courses: Vec<Course>,
    purchases: Vec<Purchase>,
}

/// 进程内存储，未配置 DATABASE_URL 时使用
///
/// 检查与写入在同一把写锁内完成，不存在竞态窗口。
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl Store for MemoryStore {
    async fn insert_principal(
        &self,
        kind: PrincipalKind,
        principal: NewPrincipal,
    ) -> Result<Principal, StoreError> {
        let mut inner = self.inner.write().await;
        let existing = inner.principals.entry(kind).or_default();
        if existing.iter().any(|p| p.email == principal.email) {
            return Err(StoreError::Duplicate);
        }

        let created = Principal {
            id: Uuid::new_v4(),
            first_name: principal.first_name,
            last_name: principal.last_name,
            email: principal.email,
            password_hash: principal.password_hash,
        };
        existing.push(created.clone());
        Ok(created)
    }

    async fn find_principal_by_email(
        &self,
        kind: PrincipalKind,
        email: &str,
    ) -> Result<Option<Principal>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .principals
            .get(&kind)
            .and_then(|all| all.iter().find(|p| p.email == email))
            .cloned())
    }

    async fn insert_course(&self, course: NewCourse) -> Result<Course, StoreError> {
        let created = Course {
            id: Uuid::new_v4(),
            title: course.title,
            description: course.description,
            price: course.price,
            image: course.image,
            creator_id: course.creator_id,
            created_at: Utc::now(),
        };
        self.inner.write().await.courses.push(created.clone());
        Ok(created)
    }

    async fn list_courses(&self) -> Result<Vec<Course>, StoreError> {
        Ok(self.inner.read().await.courses.clone())
    }

    async fn find_course(&self, id: Uuid) -> Result<Option<Course>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.courses.iter().find(|c| c.id == id).cloned())
    }

    async fn update_owned_course(
        &self,
        id: Uuid,
        creator_id: Uuid,
        changes: CourseChanges,
    ) -> Result<Option<Course>, StoreError> {
        let mut inner = self.inner.write().await;
        let Some(course) = inner
            .courses
            .iter_mut()
            .find(|c| c.id == id && c.creator_id == creator_id)
        else {
            return Ok(None);
        };
        course.apply(changes);
        Ok(Some(course.clone()))
    }

    async fn delete_owned_course(
        &self,
        id: Uuid,
        creator_id: Uuid,
    ) -> Result<Option<Course>, StoreError> {
        let mut inner = self.inner.write().await;
        let position = inner
            .courses
            .iter()
            .position(|c| c.id == id && c.creator_id == creator_id);
        Ok(position.map(|i| inner.courses.remove(i)))
    }

    async fn insert_purchase(
        &self,
        user_id: Uuid,
        course_id: Uuid,
    ) -> Result<Purchase, StoreError> {
        let mut inner = self.inner.write().await;
        if inner
            .purchases
            .iter()
            .any(|p| p.user_id == user_id && p.course_id == course_id)
        {
            return Err(StoreError::Duplicate);
        }

        let purchase = Purchase {
            id: Uuid::new_v4(),
            user_id,
            course_id,
            purchased_at: Utc::now(),
        };
        inner.purchases.push(purchase.clone());
        Ok(purchase)
    }

    async fn list_purchases(&self, user_id: Uuid) -> Result<Vec<Purchase>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .purchases
            .iter()
            .filter(|p| p.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn courses_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Course>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .courses
            .iter()
            .filter(|c| ids.contains(&c.id))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::models::CourseImage;

    fn new_principal(email: &str) -> NewPrincipal {
        NewPrincipal {
            first_name: "Grace".into(),
            last_name: "Hopper".into(),
            email: email.into(),
            password_hash: "hash".into(),
        }
    }

    fn new_course(creator_id: Uuid) -> NewCourse {
        NewCourse {
            title: "Rust 101".into(),
            description: "Ownership and borrowing".into(),
            price: 49.0,
            image: CourseImage {
                public_id: "img-1".into(),
                url: "https://cdn.example.com/img-1.png".into(),
            },
            creator_id,
        }
    }

    fn changes(title: &str) -> CourseChanges {
        CourseChanges {
            title: title.into(),
            description: "updated".into(),
            price: 10.0,
            image: None,
        }
    }

    #[tokio::test]
    async fn email_unique_within_kind_only() {
        let store = MemoryStore::new();
        store
            .insert_principal(PrincipalKind::User, new_principal("g@example.com"))
            .await
            .unwrap();
        let again = store
            .insert_principal(PrincipalKind::User, new_principal("g@example.com"))
            .await;
        assert!(matches!(again, Err(StoreError::Duplicate)));

        // 同一邮箱可以同时注册管理员
        store
            .insert_principal(PrincipalKind::Admin, new_principal("g@example.com"))
            .await
            .unwrap();
        assert!(
            store
                .find_principal_by_email(PrincipalKind::Admin, "g@example.com")
                .await
                .unwrap()
                .is_some()
        );
        assert!(
            store
                .find_principal_by_email(PrincipalKind::Admin, "other@example.com")
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn concurrent_signups_create_one_principal() {
        let store = Arc::new(MemoryStore::new());
        let mut handles = Vec::new();
        for _ in 0..16 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store
                    .insert_principal(PrincipalKind::User, new_principal("race@example.com"))
                    .await
                    .is_ok()
            }));
        }
        let mut created = 0;
        for handle in handles {
            if handle.await.unwrap() {
                created += 1;
            }
        }
        assert_eq!(created, 1);
    }

    #[tokio::test]
    async fn only_creator_updates_or_deletes() {
        let store = MemoryStore::new();
        let owner = Uuid::new_v4();
        let stranger = Uuid::new_v4();
        let course = store.insert_course(new_course(owner)).await.unwrap();

        assert!(
            store
                .update_owned_course(course.id, stranger, changes("hijacked"))
                .await
                .unwrap()
                .is_none()
        );
        assert!(
            store
                .delete_owned_course(course.id, stranger)
                .await
                .unwrap()
                .is_none()
        );

        let updated = store
            .update_owned_course(course.id, owner, changes("Rust 102"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.title, "Rust 102");
        assert_eq!(updated.image, course.image);

        let deleted = store.delete_owned_course(course.id, owner).await.unwrap();
        assert_eq!(deleted.map(|c| c.id), Some(course.id));
        assert!(store.find_course(course.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn purchase_once_per_user_and_course() {
        let store = MemoryStore::new();
        let course = store.insert_course(new_course(Uuid::new_v4())).await.unwrap();
        let user = Uuid::new_v4();
        let other = Uuid::new_v4();

        store.insert_purchase(user, course.id).await.unwrap();
        assert!(matches!(
            store.insert_purchase(user, course.id).await,
            Err(StoreError::Duplicate)
        ));
        store.insert_purchase(other, course.id).await.unwrap();

        let mine = store.list_purchases(user).await.unwrap();
        assert_eq!(mine.len(), 1);
        let courses = store
            .courses_by_ids(&[mine[0].course_id])
            .await
            .unwrap();
        assert_eq!(courses.len(), 1);
        assert_eq!(courses[0].title, "Rust 101");
    }
}
