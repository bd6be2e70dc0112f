//! MongoDB-backed collaborators.
//!
//! The latest-wins reductions run server-side as aggregation pipelines:
//! `$match` the scope, `$sort` by `(submitDate desc, seq desc)`, then
//! `$group` keeping `$first` per key. A trailing `$sort` on the group key
//! pins the output order, since `$group` alone emits in unspecified order.

use std::collections::HashMap;

use anyhow::{Context, Result};
use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::{doc, from_document, Document};
use mongodb::Database;
use serde::Deserialize;

use super::{QuestionStore, SubmissionLog};
use crate::models::events::ViewerAnswer;
use crate::models::{LatestSubmission, Question, SubmissionRecord};

pub struct MongoSubmissionLog {
    mongo: Database,
    collection: String,
}

impl MongoSubmissionLog {
    pub fn new(mongo: Database, collection: impl Into<String>) -> Self {
        Self {
            mongo,
            collection: collection.into(),
        }
    }

    fn documents(&self) -> mongodb::Collection<Document> {
        self.mongo.collection(&self.collection)
    }
}

#[async_trait]
impl SubmissionLog for MongoSubmissionLog {
    async fn append(&self, record: SubmissionRecord) -> Result<()> {
        let collection: mongodb::Collection<SubmissionRecord> =
            self.mongo.collection(&self.collection);
        collection
            .insert_one(&record)
            .await
            .context("Failed to append submission record")?;
        Ok(())
    }

    async fn latest_per_learner(
        &self,
        session: &str,
        question: &str,
    ) -> Result<Vec<LatestSubmission>> {
        let pipeline = vec![
            doc! { "$match": { "session": session, "question": question } },
            doc! { "$sort": { "submitDate": -1, "seq": -1 } },
            doc! { "$group": {
                "_id": "$answeree",
                "submitDate": { "$first": "$submitDate" },
                "submission": { "$first": "$submission" },
            }},
            doc! { "$project": {
                "_id": 0,
                "answeree": "$_id",
                "submitDate": 1,
                "submission": 1,
            }},
            doc! { "$sort": { "answeree": 1 } },
        ];

        let mut cursor = self
            .documents()
            .aggregate(pipeline)
            .await
            .context("Failed to aggregate latest submissions per learner")?;

        let mut answers = Vec::new();
        while let Some(doc) = cursor.try_next().await? {
            answers.push(from_document(doc).context("Malformed latest-submission row")?);
        }
        Ok(answers)
    }

    async fn latest_by_question(
        &self,
        session: &str,
        questions: &[String],
    ) -> Result<HashMap<String, Vec<LatestSubmission>>> {
        #[derive(Deserialize)]
        struct QuestionGroup {
            question: String,
            submissions: Vec<LatestSubmission>,
        }

        let pipeline = vec![
            doc! { "$match": {
                "session": session,
                "question": { "$in": questions.to_vec() },
            }},
            doc! { "$sort": { "submitDate": -1, "seq": -1 } },
            doc! { "$group": {
                "_id": { "answeree": "$answeree", "question": "$question" },
                "submitDate": { "$first": "$submitDate" },
                "submission": { "$first": "$submission" },
            }},
            // Pin the $push order below: newest first, learner id as tie-break.
            doc! { "$sort": { "submitDate": -1, "_id.answeree": 1 } },
            doc! { "$group": {
                "_id": "$_id.question",
                "submissions": { "$push": {
                    "answeree": "$_id.answeree",
                    "submitDate": "$submitDate",
                    "submission": "$submission",
                }},
            }},
            doc! { "$project": { "_id": 0, "question": "$_id", "submissions": 1 } },
            doc! { "$sort": { "question": 1 } },
        ];

        let mut cursor = self
            .documents()
            .aggregate(pipeline)
            .await
            .context("Failed to aggregate latest submissions by question")?;

        let mut grouped = HashMap::new();
        while let Some(doc) = cursor.try_next().await? {
            let group: QuestionGroup =
                from_document(doc).context("Malformed question-group row")?;
            grouped.insert(group.question, group.submissions);
        }
        Ok(grouped)
    }

    async fn latest_for_learner(
        &self,
        session: &str,
        answeree: &str,
        questions: &[String],
    ) -> Result<Vec<ViewerAnswer>> {
        let pipeline = vec![
            doc! { "$match": {
                "session": session,
                "answeree": answeree,
                "question": { "$in": questions.to_vec() },
            }},
            doc! { "$sort": { "submitDate": -1, "seq": -1 } },
            doc! { "$group": {
                "_id": "$question",
                "submission": { "$first": "$submission" },
            }},
            doc! { "$project": { "_id": 0, "uid": "$_id", "submission": 1 } },
            doc! { "$sort": { "uid": 1 } },
        ];

        let mut cursor = self
            .documents()
            .aggregate(pipeline)
            .await
            .context("Failed to aggregate viewer submissions")?;

        let mut answers = Vec::new();
        while let Some(doc) = cursor.try_next().await? {
            answers.push(from_document(doc).context("Malformed viewer-answer row")?);
        }
        Ok(answers)
    }
}

pub struct MongoQuestionStore {
    mongo: Database,
    collection: String,
}

impl MongoQuestionStore {
    pub fn new(mongo: Database, collection: impl Into<String>) -> Self {
        Self {
            mongo,
            collection: collection.into(),
        }
    }

    fn questions(&self) -> mongodb::Collection<Question> {
        self.mongo.collection(&self.collection)
    }
}

#[async_trait]
impl QuestionStore for MongoQuestionStore {
    async fn find_by_id(&self, id: &str) -> Result<Option<Question>> {
        self.questions()
            .find_one(doc! { "_id": id })
            .await
            .context("Failed to query questions collection")
    }

    async fn find_by_presentation_and_type(
        &self,
        presentation: &str,
        question_type: &str,
    ) -> Result<Vec<Question>> {
        let cursor = self
            .questions()
            .find(doc! { "presentation": presentation, "type": question_type })
            .sort(doc! { "_id": 1 })
            .await
            .context("Failed to query presentation questions")?;
        cursor
            .try_collect()
            .await
            .context("Failed to read presentation questions")
    }

    async fn insert_many(&self, questions: &[Question]) -> Result<()> {
        if questions.is_empty() {
            return Ok(());
        }
        self.questions()
            .insert_many(questions)
            .await
            .context("Failed to persist parsed questions")?;
        Ok(())
    }
}
