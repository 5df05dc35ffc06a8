/*!

This is the long-form manual for `nomination_ballot` and the `vote` program.

## Ballot rules

* Every nomination of the catalog gets exactly one choice.
* A choice can be changed freely until the ballot is submitted.
* Submission is accepted only when every nomination has a choice. Otherwise
  the user is told how many nominations are left (`Осталось выбрать: N`).
* A submitted ballot is final: any later selection is refused with
  `Вы уже проголосовали!`.

Rejected intents never change the ballot.

## Storage

The submitted ballot is kept under the key `userVotes`, as a JSON object
mapping nomination ids to option labels:

```text
{"1":"Фитнес-браслет FitMax","2":"Такси CityRide", ...}
```

The presence of the key means that the ballot was submitted. There is no
version number. When the stored value cannot be read, is not a JSON object of
strings, or does not cover the current catalog, it is ignored and the ballot
starts empty.

If writing the ballot fails (for example because of a storage quota), the
ballot still counts as submitted for the current session and the user gets a
warning.

The `vote` program uses a file for storage (`votes.json` by default). It also
keeps the in-progress ballot under `userVotesDraft` so that successive
invocations continue the same ballot. The draft is removed on submission.

## Results

The results are synthetic: each option receives a count drawn uniformly from
`[minVotes, maxVotes]` (50 and 199 by default). `maxVotes` may not exceed
4294967295. Options are displayed by
decreasing count, ties in catalog order, with `round(100 * count / total)`
percent.

With `"mode": "stable"` (the default) the counts are drawn once per session.
With `"mode": "jitter"` they are drawn again on every display. A `seed` makes
the counts reproducible: the same seed always gives the same results.

## Countdown

The countdown shows whole days, hours and minutes left (`3д 4ч 15м`), or
`Голосование завершено` once the deadline is reached. By default the deadline
does not close the ballot. With `"lockAfterDeadline": true`, selections and
submissions made after the deadline are refused.

## Configuration

The `vote` program reads an optional JSON settings file (`--config`). All
the fields are optional:

```text
{
  "deadline": "2024-12-31T23:59:59",
  "lockAfterDeadline": false,
  "storagePath": "votes.json",
  "catalogPath": "nominations.json",
  "tally": { "mode": "stable", "seed": "2024", "minVotes": 50, "maxVotes": 199 },
  "tickMillis": 1000
}
```

Command-line flags take precedence over the file.

A custom catalog is a JSON array of nominations:

```text
[
  {"id": "1", "title": "Best product", "description": "...", "icon": "Trophy",
   "options": ["Echo Pro", "FitMax"]}
]
```

Icons must be one of `Trophy`, `Award`, `Sparkles`, `Palette`, `Rocket`,
`Users`, `Leaf`, `Clock`, `Vote`, `List`, `BarChart3`, `CheckCircle`, `Send`,
`Crown`.

 */
